// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::aresource::AndroidFormat;
use super::csvfile::CsvFormat;
use super::json::JsonFormat;
use super::language::{is_valid_code, language_name, lookup, normalize_code, plural_count};
use super::po::PoFormat;
use super::properties::PropertiesFormat;
use super::strings::StringsFormat;
use super::{
    Capabilities, FileFormat, HeaderUpdate, PLURAL_SEPARATOR, TranslationStore, TranslationUnit,
    create_new_file, get_language_filename, is_valid_base_for_new, load, registry, save,
};
use crate::error::FormatError;
use crate::models::UnitState;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

const PO: &str = r#"# Demo translation
msgid ""
msgstr ""
"Project-Id-Version: demo\n"
"Language: de\n"

#. Menu entry
#: src/main.c:10
#, fuzzy, c-format
msgctxt "menu"
msgid "File"
msgstr "Datei"

msgid "One file"
msgid_plural "%d files"
msgstr[0] "Eine Datei"
msgstr[1] "%d Dateien"

#~ msgid "old"
#~ msgstr "alt"
"#;

// =============================================================================
// gettext
// =============================================================================

#[test]
fn test_po_parse() {
    let store = PoFormat::bilingual().parse("de.po", PO).unwrap();

    assert_eq!(store.header_value("language"), Some("de"));
    assert_eq!(store.header_notes, vec!["# Demo translation"]);
    assert_eq!(store.units.len(), 2);

    let menu = &store.units[0];
    assert_eq!(menu.context, "menu");
    assert_eq!(menu.source, "File");
    assert_eq!(menu.explanation, "Menu entry");
    assert_eq!(menu.flags, vec!["c-format"]);
    assert!(menu.fuzzy);
    assert_eq!(menu.state(), UnitState::NeedsEditing);

    let plural = &store.units[1];
    assert!(plural.is_plural());
    assert_eq!(plural.target_forms(), vec!["Eine Datei", "%d Dateien"]);
    assert_eq!(store.trailer.len(), 2);
}

#[test]
fn test_po_round_trip_is_lossless() {
    let format = PoFormat::bilingual();
    let store = format.parse("de.po", PO).unwrap();
    assert_eq!(format.serialize(&store).unwrap(), PO);
}

#[test]
fn test_po_multiline_strings() {
    let format = PoFormat::bilingual();
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::bilingual("Line one\nLine two", "Zeile eins\nZeile zwei"));

    insta::assert_snapshot!(format.serialize(&store).unwrap(), @r#"
    msgid ""
    "Line one\n"
    "Line two"
    msgstr ""
    "Zeile eins\n"
    "Zeile zwei"
    "#);

    let parsed = format.parse("x.po", &format.serialize(&store).unwrap()).unwrap();
    assert_eq!(parsed.units[0].target, "Zeile eins\nZeile zwei");
}

#[test]
fn test_po_monolingual_keys_by_msgid() {
    let content = "msgid \"app.title\"\nmsgstr \"Titel\"\n";
    let store = PoFormat::monolingual().parse("de.po", content).unwrap();
    assert_eq!(store.units[0].key(), "app.title");
    assert_eq!(store.units[0].id_hash(true), TranslationUnit::keyed("app.title", "").id_hash(true));
}

#[test]
fn test_po_parse_error_names_line() {
    let err = PoFormat::bilingual()
        .parse("bad.po", "msgid \"a\"\nbogus \"b\"\n")
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"failed to parse bad.po: line 2: unknown keyword bogus");
}

#[test]
fn test_po_update_header_on_empty_store() {
    let format = PoFormat::bilingual();
    let mut store = TranslationStore::default();
    format.update_header(
        &mut store,
        &HeaderUpdate {
            language: "pt_BR".to_string(),
            language_name: "Portuguese (Brazil)".to_string(),
            plural_forms: "nplurals=2; plural=n > 1;".to_string(),
            plural_count: 2,
            last_translator: Some("Jane Doe <jane@example.com>".to_string()),
            revision_date: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            project: "demo".to_string(),
        },
    );

    let keys: Vec<&str> = store.header.iter().map(|(k, _)| k.as_str()).collect();
    insta::assert_snapshot!(keys.join("\n"), @r"
    Project-Id-Version
    MIME-Version
    Content-Type
    Content-Transfer-Encoding
    PO-Revision-Date
    Last-Translator
    Language-Team
    Language
    Plural-Forms
    X-Generator
    ");
    assert_eq!(store.header_value("PO-Revision-Date"), Some("2026-01-02 03:04+0000"));
    assert_eq!(store.header_value("Language"), Some("pt_BR"));
    assert!(store.header_value("X-Generator").unwrap().starts_with("Transync "));
}

// =============================================================================
// JSON
// =============================================================================

#[test]
fn test_json_nested_flattens_keys() {
    let content = r#"{"menu": {"file": "Datei", "items": ["a", "b"]}, "title": "T"}"#;
    let store = JsonFormat::nested().parse("de.json", content).unwrap();
    let keys: Vec<&str> = store.units.iter().map(TranslationUnit::key).collect();
    assert_eq!(keys, vec!["menu.file", "menu.items.0", "menu.items.1", "title"]);
}

#[test]
fn test_json_nested_serialize() {
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed("menu.file", "Datei"));
    store.add_unit(TranslationUnit::keyed("menu.edit", "Bearbeiten"));
    store.add_unit(TranslationUnit::keyed("title", "Demo"));

    insta::assert_snapshot!(JsonFormat::nested().serialize(&store).unwrap(), @r#"
    {
      "menu": {
        "file": "Datei",
        "edit": "Bearbeiten"
      },
      "title": "Demo"
    }
    "#);
}

#[test]
fn test_json_nested_key_conflict() {
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed("a", "x"));
    store.add_unit(TranslationUnit::keyed("a.b", "y"));
    let err = JsonFormat::nested().serialize(&store).unwrap_err();
    assert!(matches!(err, FormatError::Serialize { .. }));
}

#[test]
fn test_json_flat_rejects_objects() {
    let err = JsonFormat::flat()
        .parse("de.json", r#"{"a": {"b": "c"}}"#)
        .unwrap_err();
    assert!(matches!(err, FormatError::Parse { .. }));
}

#[test]
fn test_webextension_keeps_description_and_placeholders() {
    let content = r#"{
  "hello": {
    "message": "Hallo $USER$",
    "description": "Greeting",
    "placeholders": {"user": {"content": "$1"}}
  }
}"#;
    let format = JsonFormat::webextension();
    let store = format.parse("messages.json", content).unwrap();
    assert_eq!(store.units[0].explanation, "Greeting");
    assert_eq!(format.check_flags(), &["placeholders"]);

    let written = format.serialize(&store).unwrap();
    let reparsed = format.parse("messages.json", &written).unwrap();
    assert_eq!(reparsed, store);
}

// =============================================================================
// Java properties
// =============================================================================

const PROPERTIES: &str = r"# Header comment

# Greeting
hello = Hallo Welt
multi = first \
    second
unicode = caf\u00e9
emoji = \uD83D\uDE00
";

#[test]
fn test_properties_parse() {
    let store = PropertiesFormat::latin1().parse("de.properties", PROPERTIES).unwrap();
    assert_eq!(store.header_notes, vec!["# Header comment"]);
    assert_eq!(store.units[0].notes, vec!["# Greeting"]);
    let values: Vec<(&str, &str)> = store
        .units
        .iter()
        .map(|u| (u.context.as_str(), u.target.as_str()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("hello", "Hallo Welt"),
            ("multi", "first second"),
            ("unicode", "café"),
            ("emoji", "\u{1F600}"),
        ]
    );
}

#[test]
fn test_properties_latin1_escapes_non_ascii() {
    let format = PropertiesFormat::latin1();
    let store = format.parse("de.properties", PROPERTIES).unwrap();
    insta::assert_snapshot!(format.serialize(&store).unwrap(), @r"
    # Header comment

    # Greeting
    hello=Hallo Welt
    multi=first second
    unicode=caf\u00E9
    emoji=\uD83D\uDE00
    ");
}

#[test]
fn test_properties_utf8_writes_verbatim() {
    let format = PropertiesFormat::utf8();
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed("key with space", " café"));
    assert_eq!(format.serialize(&store).unwrap(), "key\\ with\\ space=\\ café\n");
}

// =============================================================================
// Android resources
// =============================================================================

const ANDROID: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <!-- App name -->
    <string name="app">Demo</string>
    <string name="id" translatable="false">demo-id</string>
    <string name="quote">It\'s <b>bold</b></string>
    <plurals name="files">
        <item quantity="one">%d file</item>
        <item quantity="other">%d files</item>
    </plurals>
</resources>
"#;

#[test]
fn test_android_parse() {
    let store = AndroidFormat.parse("strings.xml", ANDROID).unwrap();
    assert_eq!(store.units.len(), 4);
    assert_eq!(store.units[0].notes, vec!["App name"]);
    assert_eq!(store.units[1].state(), UnitState::ReadOnly);
    assert_eq!(store.units[2].target, "It's <b>bold</b>");
    let files = &store.units[3];
    assert_eq!(files.quantities, vec!["one", "other"]);
    assert_eq!(files.target, format!("%d file{PLURAL_SEPARATOR}%d files"));
}

#[test]
fn test_android_round_trip_is_lossless() {
    let store = AndroidFormat.parse("strings.xml", ANDROID).unwrap();
    assert_eq!(AndroidFormat.serialize(&store).unwrap(), ANDROID);
}

#[test]
fn test_android_default_quantities() {
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed(
        "files",
        ["a", "b", "c"].join(PLURAL_SEPARATOR),
    ));
    insta::assert_snapshot!(AndroidFormat.serialize(&store).unwrap(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <plurals name="files">
            <item quantity="one">a</item>
            <item quantity="few">b</item>
            <item quantity="other">c</item>
        </plurals>
    </resources>
    "#);
}

#[test]
fn test_android_unclosed_string() {
    let err = AndroidFormat
        .parse("strings.xml", "<resources><string name=\"a\">x")
        .unwrap_err();
    assert!(matches!(err, FormatError::Parse { .. }));
}

// =============================================================================
// CSV and strings
// =============================================================================

#[test]
fn test_csv_with_and_without_header() {
    let with = CsvFormat
        .parse("de.csv", "context,source,target\nmenu,File,Datei\n")
        .unwrap();
    assert_eq!(with.units[0].context, "menu");
    assert_eq!(with.units[0].target, "Datei");

    let without = CsvFormat.parse("de.csv", "File,Datei\n").unwrap();
    assert_eq!(without.units[0].source, "File");
    assert_eq!(without.units[0].context, "");

    insta::assert_snapshot!(CsvFormat.serialize(&with).unwrap(), @r"
    context,source,target,developer_comments,fuzzy
    menu,File,Datei,,
    ");
}

#[test]
fn test_strings_parse_and_serialize() {
    let content = "/* Window title */\n\"window.title\" = \"Fenster\";\n\"quote\" = \"Say \\\"hi\\\"\\n\";\n";
    let store = StringsFormat.parse("de.strings", content).unwrap();
    assert_eq!(store.units[0].explanation, "Window title");
    assert_eq!(store.units[1].target, "Say \"hi\"\n");

    insta::assert_snapshot!(StringsFormat.serialize(&store).unwrap(), @r#"
    /* Window title */
    "window.title" = "Fenster";

    "quote" = "Say \"hi\"\n";
    "#);
}

#[test]
fn test_strings_missing_semicolon() {
    let err = StringsFormat.parse("de.strings", "\"a\" = \"b\"").unwrap_err();
    assert!(matches!(err, FormatError::Parse { .. }));
}

// =============================================================================
// Registry and file helpers
// =============================================================================

#[test]
fn test_registry_detect() {
    let detected = |name: &str| registry().detect(name).map(|f| f.id());
    assert_eq!(detected("po/de.po"), Some("po"));
    assert_eq!(detected("ext/_locales/de/messages.json"), Some("webextension"));
    assert_eq!(detected("app/src/main/res/values-de/strings.xml"), Some("aresource"));
    assert_eq!(detected("locale/de.json"), Some("json"));
    assert_eq!(detected("Base.lproj/Localizable.strings"), Some("strings"));
    assert_eq!(detected("README.md"), None);
}

#[test]
fn test_registry_get_unknown() {
    assert!(registry().get("po-mono").is_ok());
    let err = registry().get("xliff").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unknown file format: xliff");
}

#[test]
fn test_language_code_styles() {
    let po = registry().get("po").unwrap();
    let json = registry().get("json").unwrap();
    let android = registry().get("aresource").unwrap();
    assert_eq!(po.language_code("pt_BR"), "pt_BR");
    assert_eq!(json.language_code("pt_BR"), "pt-BR");
    assert_eq!(android.language_code("pt_BR"), "pt-rBR");
    assert_eq!(android.parse_language_code("pt-rBR"), "pt_BR");
    assert_eq!(get_language_filename("res/values-*/strings.xml", "pt-rBR"), "res/values-pt-rBR/strings.xml");
}

#[test]
fn test_is_valid_base_for_new() {
    let temp = temp_dir();
    let base = temp.path().join("base.po");
    std::fs::write(&base, PO).unwrap();

    assert!(is_valid_base_for_new(&PoFormat::bilingual(), Some(&base)).is_ok());
    assert!(is_valid_base_for_new(&JsonFormat::flat(), None).is_ok());
    assert!(matches!(
        is_valid_base_for_new(&CsvFormat, None),
        Err(FormatError::InvalidBase { .. })
    ));
    assert!(matches!(
        is_valid_base_for_new(&PoFormat::bilingual(), Some(&temp.path().join("missing.po"))),
        Err(FormatError::InvalidBase { .. })
    ));
    assert!(CsvFormat.capabilities().contains(Capabilities::NEW_TRANSLATION));
}

#[test]
fn test_create_new_file_untranslates_base() {
    let temp = temp_dir();
    let base = temp.path().join("po/base.po");
    let dest = temp.path().join("po/cs.po");
    std::fs::create_dir_all(base.parent().unwrap()).unwrap();
    std::fs::write(&base, PO).unwrap();

    let format = PoFormat::bilingual();
    let update = HeaderUpdate {
        language: "cs".to_string(),
        language_name: language_name("cs"),
        plural_forms: lookup("cs").unwrap().plural_forms(),
        plural_count: plural_count("cs") as usize,
        ..HeaderUpdate::default()
    };
    let revision = create_new_file(&format, &dest, Some(&base), &update).unwrap();

    let loaded = load(&format, &dest).unwrap();
    assert_eq!(loaded.revision, revision);
    assert_eq!(loaded.store.header_value("Language"), Some("cs"));
    assert_eq!(
        loaded.store.header_value("Plural-Forms"),
        Some("nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;")
    );
    assert!(loaded.store.units.iter().all(|u| u.state() == UnitState::Empty));
    assert_eq!(loaded.store.units[1].target_forms(), vec![""; 3]);
    assert!(loaded.store.trailer.is_empty());
    let written = std::fs::read_to_string(&dest).unwrap();
    assert!(written.contains("msgstr[2] \"\""));
    assert!(!written.contains("alt"));
}

#[test]
fn test_create_new_file_monolingual_keeps_keys() {
    let temp = temp_dir();
    let base = temp.path().join("res/values/strings.xml");
    let dest = temp.path().join("res/values-cs/strings.xml");
    std::fs::create_dir_all(base.parent().unwrap()).unwrap();
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&base, ANDROID).unwrap();

    let update = HeaderUpdate {
        language: "cs".to_string(),
        plural_count: plural_count("cs") as usize,
        ..HeaderUpdate::default()
    };
    create_new_file(&AndroidFormat, &dest, Some(&base), &update).unwrap();

    let template = load(&AndroidFormat, &base).unwrap().store;
    let created = load(&AndroidFormat, &dest).unwrap().store;
    let keys = |store: &TranslationStore| -> Vec<String> {
        store.units.iter().map(|u| u.key().to_string()).collect()
    };
    assert_eq!(keys(&created), keys(&template));
    assert_eq!(created.units[0].notes, vec!["App name"]);
    assert_eq!(created.units[0].state(), UnitState::Empty);
    assert_eq!(created.units[1].state(), UnitState::ReadOnly);
    assert_eq!(created.units[1].target, "demo-id");
    assert_eq!(created.units[2].state(), UnitState::Empty);

    let files = &created.units[3];
    assert_eq!(files.state(), UnitState::Empty);
    assert_eq!(files.target_forms().len(), 3);
    assert_eq!(files.quantities, vec!["one", "few", "other"]);
}

#[test]
fn test_create_new_file_single_plural_form() {
    let temp = temp_dir();
    let base = temp.path().join("base.xml");
    let dest = temp.path().join("ja.xml");
    std::fs::write(&base, ANDROID).unwrap();

    let update = HeaderUpdate {
        plural_count: plural_count("ja") as usize,
        ..HeaderUpdate::default()
    };
    create_new_file(&AndroidFormat, &dest, Some(&base), &update).unwrap();

    let created = load(&AndroidFormat, &dest).unwrap().store;
    assert_eq!(created.units[3].quantities, vec!["other"]);
    assert_eq!(created.units[3].target, "");
}

#[test]
fn test_save_latin1_round_trip() {
    let temp = temp_dir();
    let path = temp.path().join("de.properties");
    let format = PropertiesFormat::latin1();
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed("greeting", "Grüße"));

    let revision = save(&format, &path, &store).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.is_ascii());
    let loaded = load(&format, &path).unwrap();
    assert_eq!(loaded.revision, revision);
    assert_eq!(loaded.store.units[0].target, "Grüße");
}

#[test]
fn test_store_find_and_replace_unit() {
    let mut store = TranslationStore::default();
    store.add_unit(TranslationUnit::keyed("a", "1"));
    let index = store.add_unit(TranslationUnit::keyed("a", "2"));
    assert_eq!(index, 0);
    assert_eq!(store.units.len(), 1);
    assert_eq!(store.find_unit("a", ""), Some(0));

    let mut unit = store.units[0].clone();
    unit.set_target("3", UnitState::NeedsEditing);
    assert!(unit.fuzzy);
}

// =============================================================================
// Languages
// =============================================================================

#[test]
fn test_normalize_code() {
    assert_eq!(normalize_code("pt-BR"), "pt_BR");
    assert_eq!(normalize_code("pt-rBR"), "pt_BR");
    assert_eq!(normalize_code("PT_br"), "pt_BR");
    assert_eq!(normalize_code("zh-hant"), "zh_Hant");
    assert_eq!(normalize_code("sr@latin"), "sr_latin");
}

#[test]
fn test_language_lookup_falls_back_to_base() {
    assert_eq!(language_name("pt_BR"), "Portuguese (Brazil)");
    assert_eq!(language_name("de_AT"), "German");
    assert_eq!(language_name("xx"), "xx");
    assert_eq!(plural_count("ja"), 1);
    assert_eq!(plural_count("xx"), 2);
    assert!(is_valid_code("pt_BR"));
    assert!(!is_valid_code("Portuguese"));
}
