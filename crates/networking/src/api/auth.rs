//! Login and logout

use crate::PointsClient;
use jifeng_core::{Error, LoginResponse, Result};
use tracing::info;

/// Log in and store the issued credential in the client's session
pub async fn login(client: &PointsClient, username: &str, password: &str) -> Result<LoginResponse> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::AuthenticationError(
            "Username and password are required".to_string(),
        ));
    }

    let response = client.login(username, password).await?;
    client
        .session()
        .set_credential(&response.token, Some(response.user_info.clone()))
        .await?;

    info!("Logged in as {}", response.user_info.display_name());
    Ok(response)
}

/// Forget the stored credential. Purely local; the backend keeps no state.
pub async fn logout(client: &PointsClient) -> Result<()> {
    client.session().clear().await?;
    info!("Logged out");
    Ok(())
}
