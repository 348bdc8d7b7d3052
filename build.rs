use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // sqlx::migrate! embeds the SQL files; cargo watches the directory
    // recursively once it is named here.
    println!("cargo:rerun-if-changed=migrations");

    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=ACTIVITY_POINTS_BUILD_ID={}", build_id);
}
