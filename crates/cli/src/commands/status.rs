use provdir_core::db::repository::RecordRepository;

/// Run the `status` command: show the database and per-table record counts.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let (config, repo) = super::open_store(config_path).await?;
    let database = &config.directory.database;

    let db_size = std::fs::metadata(&database.path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());

    println!("Provider Directory Status");
    println!("=========================");
    println!("Instance: {}", config.directory.instance_name);
    println!("Database: {} ({})", database.path, db_size);
    println!("Delete policy: {:?}", database.delete_policy);
    println!();

    let counts = repo.table_counts().await?;
    repo.close().await;

    println!("{}", render_counts(&counts));
    Ok(())
}

fn render_counts(counts: &[(&str, i64)]) -> String {
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let total: i64 = counts.iter().map(|(_, n)| n).sum();

    let mut out = String::from("Record Counts\n-------------\n");
    for (name, count) in counts {
        out.push_str(&format!("{name:<width$}  {count:>8}\n"));
    }
    out.push_str(&format!("{:<width$}  {total:>8}", "total"));
    out
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
