//! Plain-text views of the controller data. Pure functions: they build a
//! `String` and never print.

use crate::app::controllers::dashboard::DashboardView;
use crate::core::pagination::{PageLink, PageState};
use crate::domain::model::{
    Customer, Partner, Reservation, ReservationCategory, ReservationSummary, SalesGroup,
    Transaction, TransactionSummary, TransactionType, User,
};

const PAGER_WINDOW: u64 = 2;

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

/// `1,234,567` style grouping for currency amounts.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_else(|| "-".to_string())
}

fn category_label(category: ReservationCategory) -> &'static str {
    match category {
        ReservationCategory::Tour => "Tour",
        ReservationCategory::RentalCar => "Rental car",
        ReservationCategory::Accommodation => "Accommodation",
        ReservationCategory::Golf => "Golf",
        ReservationCategory::Ticket => "Ticket",
        ReservationCategory::Other => "Other",
    }
}

pub fn pager(state: &PageState) -> String {
    let links: Vec<String> = state
        .page_links(PAGER_WINDOW)
        .iter()
        .map(|link| match link {
            PageLink::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Gap => "...".to_string(),
        })
        .collect();
    format!("{}   {}", links.join(" "), state.summary())
}

pub fn customers(rows: &[Customer]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.phone_number.clone(),
                optional(&c.email),
            ]
        })
        .collect();
    table(&["ID", "NAME", "PHONE", "EMAIL"], &rows)
}

pub fn partners(rows: &[Partner]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                format!("{:?}", p.category),
                p.contact_person.clone(),
                p.phone_number.clone(),
            ]
        })
        .collect();
    table(&["ID", "NAME", "CATEGORY", "CONTACT", "PHONE"], &rows)
}

pub fn reservations(rows: &[Reservation]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.tour_name.clone(),
                category_label(r.category).to_string(),
                r.customer
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                optional(&r.start_date),
                format!("{:?}", r.status),
                format_amount(r.total_price),
                format_amount(r.margin()),
            ]
        })
        .collect();
    table(
        &["ID", "TOUR", "CATEGORY", "CUSTOMER", "START", "STATUS", "PRICE", "MARGIN"],
        &rows,
    )
}

pub fn reservation_detail(reservation: &Reservation) -> String {
    let manager = reservation
        .manager
        .as_ref()
        .map(|m| m.username.clone())
        .unwrap_or_else(|| "-".to_string());
    let customer = reservation
        .customer
        .as_ref()
        .map(|c| format!("{} ({})", c.name, c.phone_number))
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("Reservation #{}: {}", reservation.id, reservation.tour_name),
        format!("  Category:  {}", category_label(reservation.category)),
        format!("  Customer:  {}", customer),
        format!("  Manager:   {}", manager),
        format!(
            "  Dates:     {} ~ {}",
            optional(&reservation.start_date),
            optional(&reservation.end_date)
        ),
        format!(
            "  Status:    {:?} / {:?}",
            reservation.status, reservation.payment_status
        ),
        format!(
            "  Price:     {}  Cost: {}  Margin: {}",
            format_amount(reservation.total_price),
            format_amount(reservation.total_cost),
            format_amount(reservation.margin())
        ),
    ];
    if !reservation.notes.is_empty() {
        lines.push(format!("  Notes:     {}", reservation.notes));
    }
    lines.join("\n")
}

pub fn category_sales(sales: &[(ReservationCategory, i64)]) -> String {
    let rows: Vec<Vec<String>> = sales
        .iter()
        .map(|(category, amount)| {
            vec![category_label(*category).to_string(), format_amount(*amount)]
        })
        .collect();
    table(&["CATEGORY", "SALES"], &rows)
}

pub fn transactions(rows: &[Transaction]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|t| {
            let signed = match t.transaction_type {
                TransactionType::Expense => -t.amount,
                _ => t.amount,
            };
            vec![
                t.id.to_string(),
                optional(&t.transaction_date),
                format!("{:?}", t.transaction_type),
                format_amount(signed),
                t.description.clone(),
                t.expense_item.clone().unwrap_or_default(),
                format!("{:?}", t.processing_status),
            ]
        })
        .collect();
    table(
        &["ID", "DATE", "TYPE", "AMOUNT", "DESCRIPTION", "ITEM", "STATUS"],
        &rows,
    )
}

pub fn transaction_summary(summary: &TransactionSummary) -> String {
    let rows = vec![
        vec![
            "Income".to_string(),
            format_amount(summary.income_card),
            format_amount(summary.income_cash),
            format_amount(summary.income_transfer),
            format_amount(summary.total_income),
        ],
        vec![
            "Expense".to_string(),
            format_amount(summary.expense_card),
            format_amount(summary.expense_cash),
            format_amount(summary.expense_transfer),
            format_amount(summary.total_expense),
        ],
    ];
    format!(
        "{}\nBalance: {}",
        table(&["", "CARD", "CASH", "TRANSFER", "TOTAL"], &rows),
        format_amount(summary.balance)
    )
}

pub fn reservation_summary(summary: &ReservationSummary) -> String {
    let totals = &summary.totals;
    let mut out = format!(
        "Sales: {}  Cost: {}  Margin: {}",
        format_amount(totals.total_sales),
        format_amount(totals.total_cost),
        format_amount(totals.total_margin)
    );
    if !summary.manager_counts.is_empty() {
        let rows: Vec<Vec<String>> = summary
            .manager_counts
            .iter()
            .map(|m| {
                vec![
                    m.manager_username
                        .clone()
                        .unwrap_or_else(|| "(unassigned)".to_string()),
                    m.count.to_string(),
                ]
            })
            .collect();
        out.push_str("\n\n");
        out.push_str(&table(&["MANAGER", "RESERVATIONS"], &rows));
    }
    out
}

pub fn sales_groups(groups: &[SalesGroup]) -> String {
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            let label = g
                .category
                .map(|c| category_label(c).to_string())
                .or_else(|| g.tour_name.clone())
                .or_else(|| g.manager_username.clone())
                .or_else(|| g.month.map(|m| format!("Month {}", m)))
                .unwrap_or_else(|| "-".to_string());
            vec![label, g.count.to_string(), format_amount(g.sales)]
        })
        .collect();
    table(&["GROUP", "COUNT", "SALES"], &rows)
}

pub fn user(user: &User) -> String {
    let role = if user.is_superuser { "admin" } else { "staff" };
    format!("{} (#{}, {})", user.username, user.id, role)
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = format!("Logged in as {}", user(&view.user));
    if view.show_admin_menu {
        let rows: Vec<Vec<String>> = view
            .users
            .iter()
            .map(|u| vec![u.id.to_string(), u.username.clone()])
            .collect();
        out.push_str("\n\nStaff\n");
        out.push_str(&table(&["ID", "USERNAME"], &rows));
    }
    out
}
