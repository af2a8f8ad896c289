pub const GREETING: &str = "Hello, Pulsara!";

#[utoipa::path(
    get,
    path = "/api/hello",
    tag = "system",
    responses(
        (status = 200, description = "Static greeting", body = String)
    )
)]
pub async fn hello() -> &'static str {
    GREETING
}
