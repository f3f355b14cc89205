//! End-to-end conversion tests over the public converter API.

use serde_json::{Value, json};

use crosscard_core::ConversionConfig;

use crate::error::RfcError;
use crate::rfc::convert::{card_group_to_vcards, from_vcard, group_from_vcards, to_vcard};
use crate::rfc::jscontact::{
    Card, CardGroup, Context, Name, NameComponent, NameComponentKind, Phone, PhoneFeature,
    Relation, RelationType, Resource, ResourceLabel, Title,
};
use crate::rfc::vcard::core::{VCard, VCardProperty, VCardValue};
use crate::rfc::vcard::structural_validate;

fn lenient() -> ConversionConfig {
    ConversionConfig::lenient()
}

fn localized_title_card() -> Card {
    let mut card = Card::new("urn:uuid:6d9b4f2e-39c6-4fc0-95f6-1416d0e1e3f8");
    card.titles
        .insert("TITLE-1".to_string(), Title::new("Research Scientist"));
    card.add_localization("it", "titles/TITLE-1/name", json!("Ricercatore"));
    card
}

#[test]
fn localized_field_shares_one_altid() {
    let record = to_vcard(&localized_title_card(), &lenient()).expect("converts");

    let titles: Vec<&VCardProperty> = record.get_all("TITLE").collect();
    assert_eq!(titles.len(), 2);

    let base = titles[0];
    let variant = titles[1];
    assert_eq!(base.as_text(), Some("Research Scientist"));
    assert_eq!(base.altid(), Some("1"));
    assert_eq!(base.language(), None);
    assert_eq!(variant.as_text(), Some("Ricercatore"));
    assert_eq!(variant.altid(), Some("1"));
    assert_eq!(variant.language(), Some("it"));
}

#[test]
fn unlocalized_field_has_no_altid() {
    let mut card = Card::new("urn:uuid:plain");
    card.titles
        .insert("TITLE-1".to_string(), Title::new("Engineer"));

    let record = to_vcard(&card, &lenient()).expect("converts");
    let titles: Vec<&VCardProperty> = record.get_all("TITLE").collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].altid(), None);
}

#[test]
fn preferred_sibling_serializes_first() {
    let mut card = Card::new("urn:uuid:prefs");
    card.phones
        .insert("PHONE-1".to_string(), Phone::new("tel:+1-555-000-0001"));
    let mut preferred = Phone::new("tel:+1-555-000-0002");
    preferred.meta.pref = Some(1);
    card.phones.insert("PHONE-2".to_string(), preferred);

    let record = to_vcard(&card, &lenient()).expect("converts");
    let tels: Vec<&VCardProperty> = record.get_all("TEL").collect();
    assert_eq!(tels.len(), 2);
    assert_eq!(tels[0].pref(), Some(1));
    assert_eq!(tels[1].pref(), None);
}

#[test]
fn contexts_and_features_canonicalize() {
    let mut card = Card::new("urn:uuid:types");
    let mut phone = Phone::new("tel:+1-555-000-0001").with_feature(PhoneFeature::Voice);
    // Insertion order deliberately reversed from canonical emission order.
    phone.meta.contexts.insert(Context::Work, true);
    phone.meta.contexts.insert(Context::Private, true);
    card.phones.insert("PHONE-1".to_string(), phone);

    let record = to_vcard(&card, &lenient()).expect("converts");
    let tel = record.get("TEL").expect("tel present");
    let type_param = tel.get_param("TYPE").expect("type present");
    assert_eq!(type_param.values, vec!["home", "work", "voice"]);
}

#[test]
fn invalid_overlay_rejected_with_path() {
    let mut card = localized_title_card();
    card.add_localization("it", "titles/TITLE-9/name", json!("Dottore"));

    let err = to_vcard(&card, &ConversionConfig::default()).expect_err("must fail validation");
    match err {
        RfcError::Validation(violations) => {
            assert_eq!(violations.len(), 1);
            assert!(violations.0[0].path.contains("titles/TITLE-9/name"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn missing_uid_is_structural() {
    let card = Card::default();
    assert!(matches!(
        to_vcard(&card, &lenient()),
        Err(RfcError::Structural(_))
    ));

    let record = VCard::new();
    assert!(matches!(
        from_vcard(&record, &lenient()),
        Err(RfcError::Structural(_))
    ));
}

#[test]
fn validation_reports_every_violation_at_once() {
    let mut card = Card::new("urn:uuid:bad");
    card.phones.insert("PHONE-1".to_string(), Phone::new(""));
    let mut relation = Relation::to_uri("urn:uuid:other");
    relation.text = Some("also text".to_string());
    card.relations.insert("REL-1".to_string(), relation);

    let err = to_vcard(&card, &ConversionConfig::default()).expect_err("must fail");
    match err {
        RfcError::Validation(violations) => assert_eq!(violations.len(), 2),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test_log::test]
fn native_extension_round_trips() {
    let mut card = Card::new("urn:uuid:ext");
    card.extensions
        .insert("extension:myext1".to_string(), json!("v"));
    card.extensions
        .insert("extension:myext2".to_string(), json!({"a": [1, 2]}));

    let record = to_vcard(&card, &lenient()).expect("converts");
    let jsprops: Vec<&VCardProperty> = record.get_all("JSPROP").collect();
    assert_eq!(jsprops.len(), 2);

    let back = from_vcard(&record, &lenient()).expect("converts back");
    assert_eq!(back.extensions.get("extension:myext1"), Some(&json!("v")));
    assert_eq!(
        back.extensions.get("extension:myext2"),
        Some(&json!({"a": [1, 2]}))
    );
}

#[test]
fn string_payload_stays_a_string() {
    // "true" as a string must not come back as a boolean.
    let mut card = Card::new("urn:uuid:ext");
    card.extensions.insert("extension:flag".to_string(), json!("true"));

    let record = to_vcard(&card, &lenient()).expect("converts");
    let back = from_vcard(&record, &lenient()).expect("converts back");
    assert_eq!(back.extensions.get("extension:flag"), Some(&json!("true")));
}

#[test_log::test]
fn unknown_legacy_property_round_trips() {
    let mut record = VCard::new();
    record.add_property(VCardProperty::uri("UID", "urn:uuid:gender"));
    record.add_property(VCardProperty::new(
        "GENDER",
        VCardValue::Unknown("M".to_string()),
        "M".to_string(),
    ));

    let card = from_vcard(&record, &lenient()).expect("converts");
    assert_eq!(card.extensions.get("GENDER"), Some(&json!("M")));

    let again = to_vcard(&card, &lenient()).expect("converts back");
    let gender = again.get("GENDER").expect("gender re-emitted");
    assert_eq!(gender.value, VCardValue::Unknown("M".to_string()));
}

#[test]
fn unmatched_parameter_round_trips() {
    let mut record = VCard::new();
    record.add_property(VCardProperty::uri("UID", "urn:uuid:geo"));
    record.add_property(VCardProperty::text("FN", "Pin"));
    record.add_property(
        VCardProperty::new(
            "ADR",
            VCardValue::Address(crate::rfc::vcard::core::Address {
                street: vec!["Via Roma".to_string()],
                ..Default::default()
            }),
            String::new(),
        )
        .with_param(crate::rfc::vcard::core::VCardParameter::new(
            "GEO",
            "geo:46.77,9.5",
        )),
    );

    let card = from_vcard(&record, &lenient()).expect("converts");
    assert_eq!(
        card.extensions.get("addresses/ADR-1/vcardParams/GEO"),
        Some(&json!("geo:46.77,9.5"))
    );

    let again = to_vcard(&card, &lenient()).expect("converts back");
    let adr = again.get("ADR").expect("adr re-emitted");
    assert_eq!(adr.get_param_value("GEO"), Some("geo:46.77,9.5"));
}

#[test]
fn extended_resource_label_uses_vendor_property() {
    let mut card = Card::new("urn:uuid:res");
    card.online.insert(
        "LINK-1".to_string(),
        Resource::new(
            ResourceLabel::Extended("myres".to_string()),
            "https://example.com/x",
        ),
    );

    let record = to_vcard(&card, &lenient()).expect("converts");
    let prop = record.get("X-MYRES").expect("vendor property");
    assert_eq!(prop.value.as_uri(), Some("https://example.com/x"));

    let back = from_vcard(&record, &lenient()).expect("converts back");
    let resource = back.online.values().next().expect("resource restored");
    assert_eq!(
        resource.label,
        ResourceLabel::Extended("myres".to_string())
    );
}

#[test]
fn card_group_emits_member_records() {
    let mut main = Card::new("urn:uuid:family");
    main.name = Some(Name::from_full("The Does"));
    let group = CardGroup::new(main)
        .with_member("urn:uuid:jane")
        .with_member("urn:uuid:john");

    let records = card_group_to_vcards(&group, &lenient()).expect("converts");
    assert_eq!(records.len(), 3);

    let members: Vec<&VCardProperty> = records[0].get_all("MEMBER").collect();
    assert_eq!(members.len(), 2);
    assert_eq!(records[0].get("KIND").and_then(VCardProperty::as_text), Some("group"));
    assert_eq!(records[1].uid(), Some("urn:uuid:jane"));
    assert_eq!(records[2].uid(), Some("urn:uuid:john"));

    // Every record stands on its own.
    assert!(structural_validate(&records).is_empty());

    let (back, member_cards) = group_from_vcards(&records, &lenient()).expect("converts back");
    assert_eq!(back.members.len(), 2);
    assert_eq!(member_cards.len(), 2);
}

#[test]
fn rich_card_round_trips_semantically() {
    let mut card = Card::new("urn:uuid:rich");
    card.name = Some(Name {
        full: Some("Mario Rossi".to_string()),
        components: vec![
            NameComponent::new(NameComponentKind::Given, "Mario"),
            NameComponent::new(NameComponentKind::Surname, "Rossi"),
        ],
        ..Name::from_full("Mario Rossi")
    });

    let mut phone = Phone::new("tel:+39-06-000-0000").with_feature(PhoneFeature::Voice);
    phone.meta.contexts.insert(Context::Work, true);
    phone.meta.pref = Some(1);
    card.phones.insert("PHONE-1".to_string(), phone.clone());

    card.titles
        .insert("TITLE-1".to_string(), Title::new("Research Scientist"));
    card.add_localization("it", "titles/TITLE-1/name", json!("Ricercatore"));

    let record = to_vcard(&card, &lenient()).expect("converts");
    let back = from_vcard(&record, &lenient()).expect("converts back");

    assert_eq!(back.uid, card.uid);
    let name = back.name.as_ref().expect("name restored");
    assert_eq!(name.full.as_deref(), Some("Mario Rossi"));
    assert_eq!(name.joined(&NameComponentKind::Given), vec!["Mario"]);
    assert_eq!(name.joined(&NameComponentKind::Surname), vec!["Rossi"]);

    let restored_phone = &back.phones["PHONE-1"];
    assert_eq!(restored_phone.number, phone.number);
    assert_eq!(restored_phone.features, phone.features);
    assert_eq!(restored_phone.meta.contexts, phone.meta.contexts);
    assert_eq!(restored_phone.meta.pref, Some(1));

    assert_eq!(back.titles["TITLE-1"].name, "Research Scientist");
    assert_eq!(
        back.localizations["it"].get("titles/TITLE-1/name"),
        Some(&json!("Ricercatore"))
    );
}

#[test]
fn relation_types_round_trip() {
    let mut card = Card::new("urn:uuid:rel");
    card.relations.insert(
        "RELATION-1".to_string(),
        Relation::to_uri("urn:uuid:friend").with_kind(RelationType::Friend),
    );

    let record = to_vcard(&card, &lenient()).expect("converts");
    let related = record.get("RELATED").expect("related present");
    assert!(related.has_type("friend"));
    assert_eq!(related.value.as_uri(), Some("urn:uuid:friend"));

    let back = from_vcard(&record, &lenient()).expect("converts back");
    let relation = back.relations.values().next().expect("relation restored");
    assert_eq!(relation.uri.as_deref(), Some("urn:uuid:friend"));
    assert_eq!(relation.relation.get(&RelationType::Friend), Some(&true));
}

#[test]
fn auto_prod_id_and_rev_emitted() {
    let mut card = Card::new("urn:uuid:meta");
    card.updated = Some(
        chrono::DateTime::parse_from_rfc3339("1995-10-31T22:27:10Z")
            .expect("valid timestamp")
            .with_timezone(&chrono::Utc),
    );

    let config = ConversionConfig {
        validate_input: false,
        ..ConversionConfig::default()
    };
    let record = to_vcard(&card, &config).expect("converts");
    assert!(record.get("PRODID").is_some());
    assert_eq!(record.get("REV").expect("rev").raw_value, "19951031T222710Z");
}

#[test]
fn default_language_variant_sorts_first() {
    let mut card = localized_title_card();
    card.add_localization("de", "titles/TITLE-1/name", json!("Forscher"));

    let config = ConversionConfig {
        validate_input: false,
        auto_prod_id: false,
        ..ConversionConfig::default()
    }
    .with_default_language("it");

    let record = to_vcard(&card, &config).expect("converts");
    let titles: Vec<&VCardProperty> = record.get_all("TITLE").collect();
    assert_eq!(titles.len(), 3);
    assert_eq!(titles[0].language(), None);
    assert_eq!(titles[1].language(), Some("it"));
    assert_eq!(titles[2].language(), Some("de"));
}

#[test]
fn text_syntax_end_to_end() {
    let card = localized_title_card();
    let record = to_vcard(&card, &lenient()).expect("converts");

    let text = crate::rfc::vcard::write_text(std::slice::from_ref(&record));
    let parsed = crate::rfc::vcard::parse_text(&text).expect("parses");
    let back = from_vcard(&parsed[0], &lenient()).expect("converts back");

    assert_eq!(back.titles["TITLE-1"].name, "Research Scientist");
    assert_eq!(
        back.localizations["it"].get("titles/TITLE-1/name"),
        Some(&json!("Ricercatore"))
    );
}

#[test]
fn group_without_group_record_is_structural_error() {
    let mut record = VCard::new();
    record.add_property(VCardProperty::uri("UID", "urn:uuid:solo"));
    let result = group_from_vcards(&[record], &lenient());
    assert!(matches!(result, Err(RfcError::Structural(_))));
}

#[test]
fn extension_value_kinds_survive_json_boundary() {
    let mut card = Card::new("urn:uuid:json");
    card.extensions.insert("extension:n".to_string(), json!(5));
    card.extensions
        .insert("extension:o".to_string(), json!({"nested": true}));

    let serialized = serde_json::to_string(&card).expect("serializes");
    let reparsed: Card = serde_json::from_str(&serialized).expect("deserializes");
    assert_eq!(reparsed, card);

    let extensions: Vec<&Value> = reparsed.extensions.values().collect();
    assert_eq!(extensions.len(), 2);
}
