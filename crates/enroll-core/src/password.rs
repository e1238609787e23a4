//! Deterministic initial-credential generation.
//!
//! The generated password doubles as a support artefact: given the same
//! first name and date of birth it must always re-derive to the same string.

/// Handed out when either input is missing — e.g. a staff record keyed in
/// without a date of birth.
pub const FALLBACK_PASSWORD: &str = "ADMIN@123";

/// Used when the date of birth carries no recognisable four-digit year.
pub const FALLBACK_YEAR: &str = "2024";

/// Derive the initial login credential from a first name and date of birth.
///
/// First three characters of the whitespace-stripped first name, uppercased
/// (fewer if the name is shorter), followed by the first run of four digits
/// found in `dob`. `("Ashish", "2004-05-12")` → `"ASH2004"`.
pub fn generate_password(first_name: Option<&str>, dob: Option<&str>) -> String {
  let name = first_name.map(str::trim).filter(|n| !n.is_empty());
  let (name, dob) = match (name, dob) {
    (Some(n), Some(d)) => (n, d),
    _ => return FALLBACK_PASSWORD.to_owned(),
  };

  let prefix: String = name
    .chars()
    .filter(|c| !c.is_whitespace())
    .take(3)
    .flat_map(char::to_uppercase)
    .collect();

  format!("{prefix}{}", birth_year(dob))
}

/// First run of four consecutive ASCII digits, or [`FALLBACK_YEAR`].
fn birth_year(dob: &str) -> &str {
  let bytes = dob.as_bytes();
  for i in 0..bytes.len().saturating_sub(3) {
    if bytes[i..i + 4].iter().all(u8::is_ascii_digit) {
      return &dob[i..i + 4];
    }
  }
  FALLBACK_YEAR
}
