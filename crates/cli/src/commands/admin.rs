//! Administrator account management.

use copperleaf_backend::services::admins::{AdminService, CreateAdminInput};

/// Create an administrator account.
///
/// # Errors
///
/// Returns an error if configuration is missing, input fails validation, or
/// the email is already registered.
pub async fn create(
    email: &str,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store) = super::connect().await?;

    let admin = AdminService::new(&store)
        .create(CreateAdminInput {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        })
        .await?;

    tracing::info!(admin_id = %admin.id, email = %admin.email, "admin created");
    Ok(())
}
