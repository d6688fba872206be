/*!
 * Tests for ISO language code utilities
 */

use pagetext::language_utils::{
    get_language_name, language_codes_match, normalize_language_code, validate_language_code,
};

#[test]
fn test_normalizeLanguageCode_withThreeLetterCodes_shouldPreferTwoLetterForm() {
    assert_eq!(normalize_language_code("zho").unwrap(), "zh");
    assert_eq!(normalize_language_code("chi").unwrap(), "zh");
    assert_eq!(normalize_language_code("GER").unwrap(), "de");
    assert_eq!(normalize_language_code("en").unwrap(), "en");
}

#[test]
fn test_languageCodesMatch_acrossStandards_shouldMatch() {
    assert!(language_codes_match("ja", "jpn"));
    assert!(language_codes_match("fre", "fr"));
    assert!(!language_codes_match("ko", "zh"));
    assert!(!language_codes_match("??", "zh"));
}

#[test]
fn test_getLanguageName_shouldUseEnglishNames() {
    assert_eq!(get_language_name("ko").unwrap(), "Korean");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert!(get_language_name("").is_err());
}

#[test]
fn test_validateLanguageCode_withGarbage_shouldFail() {
    assert!(validate_language_code("english").is_err());
    assert!(validate_language_code("1").is_err());
}
