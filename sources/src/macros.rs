//! Define our own macro to simplify the code
//!

/// Call the HTTP client with the proper arguments
///
/// - unauth call to fetch data
///
#[macro_export]
macro_rules! http_get {
    ($self:ident, $url:expr) => {
        $self
            .client
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("accept", "application/json")
            .send()
    };
}

/// Call the HTTP client with the proper arguments
///
/// - auth call to fetch data, the token is sent as-is, without any scheme
///
#[macro_export]
macro_rules! http_get_auth {
    ($self:ident, $url:expr, $token:expr) => {
        $self
            .client
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("accept", "application/json")
            .header("authorization", $token)
            .send()
    };
}
