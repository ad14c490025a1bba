use url::form_urlencoded;

/// Joins the API base address and a resource path.
///
/// Leading slashes on the path and trailing slashes on the base are dropped,
/// and the path always ends in exactly one `/` placed before any query string.
pub fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    let (resource, query) = match path.split_once('?') {
        Some((resource, query)) => (resource, Some(query)),
        None => (path, None),
    };

    let resource = resource.trim_end_matches('/');
    let mut url = String::with_capacity(base.len() + path.len() + 2);
    url.push_str(base);
    url.push('/');
    if !resource.is_empty() {
        url.push_str(resource);
        url.push('/');
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Appends URL-encoded query pairs to a resource path. Pairs with an empty
/// value are skipped, matching how the dashboard forms drop blank filters.
pub fn with_query<'a, I>(path: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if value.is_empty() {
            continue;
        }
        serializer.append_pair(key, value);
        any = true;
    }
    if !any {
        return path.to_string();
    }
    let query = serializer.finish();
    if path.contains('?') {
        format!("{}&{}", path, query)
    } else {
        format!("{}?{}", path, query)
    }
}

/// `resource/<id>`
pub fn item_path(resource: &str, id: i64) -> String {
    format!("{}/{}", resource.trim_end_matches('/'), id)
}
