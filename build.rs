use std::env;

/// Largest minute the panel can show, used to sanity check `WAKECLOCK_*` overrides.
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Forward an optional first-boot minute override to the crate.
///
/// `WAKECLOCK_INITIAL_MINUTE=0 cargo build ...` flashes a firmware that starts
/// counting from midnight instead of the default pre-midnight offset.
fn forward_initial_minute() {
    println!("cargo:rerun-if-env-changed=WAKECLOCK_INITIAL_MINUTE");

    let Ok(raw) = env::var("WAKECLOCK_INITIAL_MINUTE") else {
        return;
    };

    match raw.trim().parse::<u32>() {
        Ok(minute) if minute < MINUTES_PER_DAY => {
            println!("cargo:rustc-env=WAKECLOCK_FIRST_BOOT_MINUTE={}", minute);
            println!("cargo:warning=First boot minute set to {}", minute);
        }
        _ => {
            println!(
                "cargo:warning=Ignoring WAKECLOCK_INITIAL_MINUTE='{}', expected 0..{}",
                raw, MINUTES_PER_DAY
            );
        }
    }
}

fn main() {
    // Host builds only run the library tests, there is no ESP-IDF to forward
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    forward_initial_minute();
}
