//! Norwegian organization number validation (modulo-11 check digit).

const WEIGHTS: [u32; 8] = [3, 2, 7, 6, 5, 4, 3, 2];

/// Validate a 9-digit organization number, returning the normalized
/// (whitespace-stripped) form.
///
/// The check digit is 11 minus the weighted sum of the first 8 digits mod 11;
/// a computed value of 10 means no valid check digit exists, and 11 maps to 0.
pub fn validate_organization_number(raw: &str) -> Result<String, String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() != 9 || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err("Organization number must be exactly 9 digits".to_string());
    }

    let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits[..8].iter().zip(WEIGHTS.iter()).map(|(d, w)| d * w).sum();

    let check = match 11 - (sum % 11) {
        10 => return Err("Organization number has an invalid check digit".to_string()),
        11 => 0,
        n => n,
    };

    if check != digits[8] {
        return Err("Organization number check digit does not match".to_string());
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_valid_numbers_pass() {
        assert_eq!(validate_organization_number("923609016").unwrap(), "923609016");
        assert_eq!(validate_organization_number("974760673").unwrap(), "974760673");
    }

    #[test]
    fn whitespace_is_stripped() {
        assert_eq!(validate_organization_number(" 923 609 016 ").unwrap(), "923609016");
    }

    #[test]
    fn wrong_length_or_non_digits_fail() {
        assert!(validate_organization_number("12345678").is_err());
        assert!(validate_organization_number("1234567890").is_err());
        assert!(validate_organization_number("92360901x").is_err());
        assert!(validate_organization_number("").is_err());
    }

    #[test]
    fn any_single_digit_mutation_fails() {
        let valid = "923609016";
        for pos in 0..9 {
            for replacement in b'0'..=b'9' {
                let mut mutated = valid.as_bytes().to_vec();
                if mutated[pos] == replacement {
                    continue;
                }
                mutated[pos] = replacement;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(
                    validate_organization_number(&mutated).is_err(),
                    "mutation {mutated} unexpectedly passed"
                );
            }
        }
    }
}
