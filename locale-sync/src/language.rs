//! Language code to display name lookup
//!
//! Codes are parsed as BCP 47 locales with `icu_locale`; the language
//! subtag is then mapped to the language's own name (its endonym), which is
//! what translation prompts are phrased with: `fr` -> `français`,
//! `pt-BR` -> `português (BR)`. A well-formed two or three letter language
//! missing from the table is named by its normalized code (`nv-US` ->
//! `nv (US)`), which the translation backends understand as well.

use icu_locale::Locale;

use crate::error::{DocumentError, DocumentResult};

/// Self-names of the languages we know how to ask for
const ENDONYMS: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "አማርኛ"),
    ("ar", "العربية"),
    ("as", "অসমীয়া"),
    ("az", "azərbaycan"),
    ("be", "беларуская"),
    ("bg", "български"),
    ("bn", "বাংলা"),
    ("br", "brezhoneg"),
    ("bs", "bosanski"),
    ("ca", "català"),
    ("co", "corsu"),
    ("cs", "čeština"),
    ("cy", "Cymraeg"),
    ("da", "dansk"),
    ("de", "Deutsch"),
    ("el", "Ελληνικά"),
    ("en", "English"),
    ("eo", "esperanto"),
    ("es", "español"),
    ("et", "eesti"),
    ("eu", "euskara"),
    ("fa", "فارسی"),
    ("fi", "suomi"),
    ("fil", "Filipino"),
    ("fo", "føroyskt"),
    ("fr", "français"),
    ("fy", "Frysk"),
    ("ga", "Gaeilge"),
    ("gd", "Gàidhlig"),
    ("gl", "galego"),
    ("gu", "ગુજરાતી"),
    ("ha", "Hausa"),
    ("he", "עברית"),
    ("hi", "हिन्दी"),
    ("hr", "hrvatski"),
    ("ht", "Kreyòl ayisyen"),
    ("hu", "magyar"),
    ("hy", "հայերեն"),
    ("id", "Indonesia"),
    ("ig", "Igbo"),
    ("is", "íslenska"),
    ("it", "italiano"),
    ("ja", "日本語"),
    ("jv", "Jawa"),
    ("ka", "ქართული"),
    ("kk", "қазақ тілі"),
    ("km", "ខ្មែរ"),
    ("kn", "ಕನ್ನಡ"),
    ("ko", "한국어"),
    ("ku", "kurdî"),
    ("ky", "кыргызча"),
    ("la", "Latina"),
    ("lb", "Lëtzebuergesch"),
    ("lo", "ລາວ"),
    ("lt", "lietuvių"),
    ("lv", "latviešu"),
    ("mi", "Māori"),
    ("mk", "македонски"),
    ("ml", "മലയാളം"),
    ("mn", "монгол"),
    ("mr", "मराठी"),
    ("ms", "Melayu"),
    ("mt", "Malti"),
    ("my", "မြန်မာ"),
    ("nb", "norsk bokmål"),
    ("ne", "नेपाली"),
    ("nl", "Nederlands"),
    ("nn", "norsk nynorsk"),
    ("no", "norsk"),
    ("or", "ଓଡ଼ିଆ"),
    ("pa", "ਪੰਜਾਬੀ"),
    ("pl", "polski"),
    ("ps", "پښتو"),
    ("pt", "português"),
    ("ro", "română"),
    ("ru", "русский"),
    ("rw", "Kinyarwanda"),
    ("sd", "سنڌي"),
    ("si", "සිංහල"),
    ("sk", "slovenčina"),
    ("sl", "slovenščina"),
    ("sn", "chiShona"),
    ("so", "Soomaali"),
    ("sq", "shqip"),
    ("sr", "српски"),
    ("su", "Basa Sunda"),
    ("sv", "svenska"),
    ("sw", "Kiswahili"),
    ("ta", "தமிழ்"),
    ("te", "తెలుగు"),
    ("tg", "тоҷикӣ"),
    ("th", "ไทย"),
    ("tk", "türkmen dili"),
    ("tl", "Tagalog"),
    ("tr", "Türkçe"),
    ("uk", "українська"),
    ("ur", "اردو"),
    ("uz", "o‘zbek"),
    ("vi", "Tiếng Việt"),
    ("xh", "isiXhosa"),
    ("yi", "ייִדיש"),
    ("yo", "Èdè Yorùbá"),
    ("zh", "中文"),
    ("zu", "isiZulu"),
];

/// Resolve a language code to a human-readable name
///
/// # Errors
///
/// [`DocumentError::UnrecognizedLanguageCode`] when the code is not a valid
/// locale, is `und`, or has a language subtag longer than three letters that
/// we have no name for.
pub fn display_name(code: &str) -> DocumentResult<String> {
    let unrecognized = || DocumentError::UnrecognizedLanguageCode(code.to_string());

    let locale: Locale = code.trim().parse().map_err(|_| unrecognized())?;
    let language = locale.id.language.as_str();

    let mut name = match (language, locale.id.script.as_ref().map(|s| s.as_str())) {
        ("zh", Some("Hans")) => "简体中文".to_string(),
        ("zh", Some("Hant")) => "繁體中文".to_string(),
        _ => match ENDONYMS.iter().find(|(tag, _)| *tag == language) {
            Some((_, name)) => name.to_string(),
            None if is_plain_language(language) => language.to_string(),
            None => return Err(unrecognized()),
        },
    };

    if let Some(region) = locale.id.region {
        name.push_str(&format!(" ({})", region.as_str()));
    }

    Ok(name)
}

/// ISO 639 style subtags; reserved 4-8 letter subtags and `und` are not names
fn is_plain_language(language: &str) -> bool {
    language != "und" && (2..=3).contains(&language.len())
}
