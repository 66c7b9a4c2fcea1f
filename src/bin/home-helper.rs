use std::time::Duration;

use dotenv::dotenv;
use home_helper::prelude::*;
use home_helper::repository::{validation, MockOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load HOME_HELPER_* overrides from a .env file, if any
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = ControllerOptions::from_env()?;
    let repository = MockAuthRepository::new_with_options(
        MockOptions::default().with_latency(Duration::from_millis(150)),
    );
    let controller = AuthController::spawn_with_options(repository, options)?;

    let mut states = controller.subscribe();
    let listener = tokio::spawn(async move {
        while let Some(state) = states.recv().await {
            match (state.user(), state.error_message()) {
                (Some(user), _) => info!(
                    "state: {:?} as {} <{}>",
                    state.status(),
                    user.name,
                    user.email
                ),
                (None, Some(message)) => warn!("state: {:?}: {}", state.status(), message),
                (None, None) => info!("state: {:?}", state.status()),
            }
        }
    });

    controller.process(AuthEvent::CheckAuthStatus).await?;

    let (name, email, password) = ("Home Owner", "owner@example.com", "hunter22");
    validation::validate_name(name)?;
    validation::validate_email(email)?;
    validation::validate_password(password)?;
    controller
        .process(AuthEvent::register(name, email, password))
        .await?;

    controller
        .process(AuthEvent::update_profile(ProfileUpdate::new(
            None,
            Some("https://example.com/avatar.png".to_string()),
        )))
        .await?;

    controller.process(AuthEvent::SignOutRequested).await?;

    // Ignored: nobody is signed in
    controller
        .process(AuthEvent::update_profile(ProfileUpdate::new(
            Some("Nobody".to_string()),
            None,
        )))
        .await?;

    let final_state = controller
        .process(AuthEvent::sign_in(email, password))
        .await?;
    info!("final status: {:?}", final_state.status());

    drop(controller);
    listener.await?;

    Ok(())
}
