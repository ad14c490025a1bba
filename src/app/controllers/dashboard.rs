use crate::core::session::Session;
use crate::core::{Surface, TokenStore};
use crate::domain::model::User;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub user: User,
    pub show_admin_menu: bool,
    pub users: Vec<User>,
}

pub struct DashboardPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
}

impl<'a, S: TokenStore, U: Surface> DashboardPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>) -> Self {
        Self { session }
    }

    /// Current user; superusers also get the staff list that feeds the
    /// manager filters, everyone else only sees themselves.
    pub async fn load(&self) -> Result<DashboardView> {
        self.session.require_login().await?;
        let user = self.session.user_info().await?;

        let users: Vec<User> = if user.is_superuser {
            self.session.gateway().get("users").await?
        } else {
            vec![user.clone()]
        };

        Ok(DashboardView {
            show_admin_menu: user.is_superuser,
            user,
            users,
        })
    }
}
