use provdir_core::db::repository::{RecordRepository, UserRepository};
use provdir_core::models::user::{NewUser, User, UserPatch};
use tracing::info;

/// Options for `user add`.
pub struct AddUser {
    pub username: String,
    pub password: String,
    pub admin: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Run `user add`: create a console user with a hashed password.
pub async fn add(config_path: &str, opts: AddUser) -> anyhow::Result<()> {
    let (_, repo) = super::open_store(config_path).await?;

    let new = NewUser {
        first_name: opts.first_name,
        last_name: opts.last_name,
        username: opts.username,
        password: opts.password,
        department_id: None,
        role_id: None,
        is_admin: opts.admin,
    };
    let result = repo.create(&new).await;
    repo.close().await;

    let user: User = result?;
    info!(user_id = user.id, "Created user {}", user.username);
    println!(
        "Created user '{}' (id {}{})",
        user.username,
        user.id,
        if user.is_admin { ", administrator" } else { "" }
    );
    Ok(())
}

/// Run `user set-password`: replace a user's password hash.
pub async fn set_password(config_path: &str, username: &str, password: &str) -> anyhow::Result<()> {
    let (_, repo) = super::open_store(config_path).await?;
    let result = reset(&repo, username, password).await;
    repo.close().await;

    let user = result?;
    info!(user_id = user.id, "Password changed for {}", user.username);
    println!("Password updated for '{}'", user.username);
    Ok(())
}

async fn reset<R>(repo: &R, username: &str, password: &str) -> anyhow::Result<User>
where
    R: RecordRepository + UserRepository,
{
    let Some(user) = repo.get_user_by_username(username.trim()).await? else {
        anyhow::bail!("no user named '{}'", username.trim());
    };

    let patch = UserPatch {
        password: Some(password.to_string()),
        ..Default::default()
    };
    Ok(repo.update(user.id, &patch).await?)
}
