//! Manage the persisted high-resolution consent flag.

use cubecap_common::config::{AppConfig, CONSENT_THRESHOLD, MAX_RESOLUTION};

pub fn run(grant: bool, revoke: bool) -> anyhow::Result<()> {
    let mut app = AppConfig::load();

    if grant {
        println!(
            "Resolutions above {CONSENT_THRESHOLD} (up to {MAX_RESOLUTION}) can be very slow \
             and produce large files."
        );
        app.high_res_consent = true;
        app.save()?;
        println!("High-resolution consent granted.");
    } else if revoke {
        app.high_res_consent = false;
        app.save()?;
        println!("High-resolution consent revoked.");
    } else {
        println!(
            "High-resolution consent: {}",
            if app.high_res_consent {
                "granted"
            } else {
                "not granted"
            }
        );
    }

    Ok(())
}
