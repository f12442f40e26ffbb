pub mod assessment;
pub mod enums;
pub mod tracking;

pub use assessment::*;
pub use enums::*;
pub use tracking::*;

/// Normalises a patient identifier (trimmed, lower-cased e-mail style key).
pub fn normalize_patient_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_id_is_trimmed_and_lowercased() {
        assert_eq!(normalize_patient_id("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }
}
