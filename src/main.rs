//! Wakeclock firmware entry point
//!
//! Runs exactly one wake cycle per boot and ends in deep sleep, `main` never
//! returns on the board.

#[cfg(target_os = "espidf")]
mod platform;

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    platform::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "wakeclock is firmware for the ESP32, build it with `cargo build --target xtensa-esp32-espidf`"
    );
}
