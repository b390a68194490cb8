use crate::error::Result;
use crate::models::CyclistProfile;
use crate::normalize::decode_json;
use std::path::Path;

/// Leser rytterprofil fra disk (JSON) og validerer den.
/// Hvis filen ikke finnes, returneres en default-profil.
pub fn load_profile(path: impl AsRef<Path>) -> Result<CyclistProfile> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let profile: CyclistProfile = decode_json(&contents)?;
        profile.validate()?;
        log::info!(
            "profile loaded from {} (mass={} kg, size={} m)",
            path.display(),
            profile.mass,
            profile.size
        );
        Ok(profile)
    } else {
        log::warn!("no profile at {}, using default", path.display());
        Ok(CyclistProfile::default())
    }
}

/// Lagrer profil til disk som JSON (pretty-print).
pub fn save_profile(profile: &CyclistProfile, path: impl AsRef<Path>) -> Result<()> {
    profile.validate()?;
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path.as_ref(), json)?;
    log::info!("profile saved to {}", path.as_ref().display());
    Ok(())
}
