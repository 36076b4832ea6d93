use strategy_forge_types::{is_filesystem_safe_name, is_valid_address};

const HEX: &[u8] = b"0123456789abcdefABCDEF";

/// Deterministic pseudo-random hex strings of the given length
fn hex_strings(len: usize, count: usize) -> Vec<String> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    HEX[(state >> 33) as usize % HEX.len()] as char
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_every_well_formed_address_is_accepted() {
    for digits in hex_strings(40, 500) {
        let address = format!("0x{digits}");
        assert!(is_valid_address(&address), "{address}");
    }
}

#[test]
fn test_wrong_length_is_rejected() {
    for len in (0..=45).filter(|len| *len != 40) {
        for digits in hex_strings(len, 20) {
            let address = format!("0x{digits}");
            assert!(!is_valid_address(&address), "{address}");
        }
    }
}

#[test]
fn test_non_hex_character_is_rejected() {
    for digits in hex_strings(40, 50) {
        for (idx, bad) in [(0, 'g'), (17, 'z'), (39, ' '), (20, 'x')] {
            let mut chars: Vec<char> = digits.chars().collect();
            chars[idx] = bad;
            let address = format!("0x{}", chars.into_iter().collect::<String>());
            assert!(!is_valid_address(&address), "{address}");
        }
    }
}

#[test]
fn test_names_with_separators_are_rejected() {
    for base in ["strategy", "Test-Strategy_123", "a b c"] {
        for bad in ["..", "/", "\\"] {
            assert!(!is_filesystem_safe_name(&format!("{base}{bad}")));
            assert!(!is_filesystem_safe_name(&format!("{bad}{base}")));
            assert!(!is_filesystem_safe_name(&format!("{base}{bad}{base}")));
        }
        assert!(is_filesystem_safe_name(base));
    }
    assert!(!is_filesystem_safe_name(""));
}
