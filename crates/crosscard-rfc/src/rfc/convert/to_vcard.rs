//! Native → legacy conversion.
//!
//! Walks every native property and emits zero or more legacy properties.
//! A logical field with localized variants gets one freshly allocated ALTID
//! shared by its base and every variant; emission order keeps same-ALTID
//! variants contiguous and default-language-first, and orders siblings by
//! preference.

use std::collections::BTreeMap;

use crosscard_core::ConversionConfig;
use serde_json::Value;

use super::tokens;
use crate::error::{RfcError, RfcResult};
use crate::rfc::jscontact::{
    Anniversary, AnniversaryKind, Card, CardGroup, CardKind, EmailAddress, Name,
    NameComponentKind, Nickname, Note, Organization, PersonalInfo, PersonalInfoKind, Phone,
    PropMeta, Relation, Resource, ResourceLabel, Title, localize,
};
use crate::rfc::jscontact::properties::Address as NativeAddress;
use crate::rfc::validation::{Violations, validate};
use crate::rfc::vcard::core::parameter::names as params;
use crate::rfc::vcard::core::property::names;
use crate::rfc::vcard::core::{
    Address, Organization as LegacyOrganization, StructuredName, VCard, VCardParameter,
    VCardProperty, VCardValue,
};

/// Product identifier emitted when `auto_prod_id` is set and the card has
/// none of its own.
const PRODID_VALUE: &str = "-//crosscard//crosscard 0.1//EN";

/// Monotonic per-card ALTID source, scoped to a single conversion call.
#[derive(Debug)]
pub(crate) struct AltidAllocator {
    next: u32,
}

impl AltidAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocates the id for the next logical field that needs grouping.
    pub(crate) fn allocate(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

/// Converts a native card into one legacy record.
///
/// ## Errors
/// - [`RfcError::Structural`] when the card has no identifier.
/// - [`RfcError::Validation`] when `validate_input` is set and the card
///   fails validation; every violation is reported, no partial record is
///   returned.
pub fn to_vcard(card: &Card, config: &ConversionConfig) -> RfcResult<VCard> {
    config.check()?;

    if card.uid.trim().is_empty() {
        return Err(RfcError::Structural(
            "card has no uid; the legacy record requires one".to_string(),
        ));
    }

    if config.validate_input {
        let violations = validate(card);
        if !violations.is_empty() {
            return Err(RfcError::Validation(Violations(violations)));
        }
    }

    // Materialize each language variant once; the emitters pull the
    // per-entity variants out of these.
    let mut localized: BTreeMap<String, Card> = BTreeMap::new();
    for language in card.localizations.keys() {
        let (variant, violations) = localize::resolve_collect(card, language)?;
        if !violations.is_empty() {
            // validate_input would have rejected these; in lenient mode the
            // bad pointers are skipped and everything else still converts.
            tracing::debug!(language, count = violations.len(), "skipped overlay entries");
        }
        localized.insert(language.clone(), variant);
    }

    let default_language = config.default_language.as_deref();
    let mut alloc = AltidAllocator::new();
    let mut record = VCard::with_version(config.version);
    let mut emitted_paths: BTreeMap<String, usize> = BTreeMap::new();

    record.add_property(VCardProperty::uri(names::UID, &card.uid));
    if let Some(kind) = &card.kind {
        record.add_property(VCardProperty::text(names::KIND, kind.as_token()));
    }

    emit_name(card, &localized, default_language, &mut alloc, &mut record);

    emit_collection(
        card,
        &localized,
        "nicknames",
        |c| &c.nicknames,
        emit_nickname,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "addresses",
        |c| &c.addresses,
        emit_address,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "phones",
        |c| &c.phones,
        emit_phone,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "emails",
        |c| &c.emails,
        emit_email,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "online",
        |c| &c.online,
        emit_resource,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "organizations",
        |c| &c.organizations,
        emit_organization,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "titles",
        |c| &c.titles,
        emit_title,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "notes",
        |c| &c.notes,
        emit_note,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "anniversaries",
        |c| &c.anniversaries,
        emit_anniversary,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "personalInfo",
        |c| &c.personal_info,
        emit_personal_info,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;
    emit_collection(
        card,
        &localized,
        "relations",
        |c| &c.relations,
        emit_relation,
        &mut alloc,
        default_language,
        &mut record,
        &mut emitted_paths,
    )?;

    for (uid, flagged) in &card.members {
        if *flagged {
            record.add_property(VCardProperty::uri(names::MEMBER, uid));
        }
    }

    emit_extensions(card, &emitted_paths, &mut record);

    if let Some(prod_id) = card
        .prod_id
        .clone()
        .or_else(|| config.auto_prod_id.then(|| PRODID_VALUE.to_string()))
    {
        record.add_property(VCardProperty::text(names::PRODID, prod_id));
    }
    if let Some(updated) = card.updated {
        record.add_property(VCardProperty::new(
            names::REV,
            VCardValue::Timestamp(updated),
            updated.format("%Y%m%dT%H%M%SZ").to_string(),
        ));
    }

    Ok(record)
}

/// Converts a card group: the main record carries MEMBER references, and
/// each member uid yields one independently valid minimal record.
///
/// ## Errors
/// Propagates any failure converting the main card.
pub fn card_group_to_vcards(group: &CardGroup, config: &ConversionConfig) -> RfcResult<Vec<VCard>> {
    let mut main = group.card.clone();
    main.kind = Some(CardKind::Group);
    for (uid, flagged) in &group.members {
        main.members.insert(uid.clone(), *flagged);
    }

    let mut records = vec![to_vcard(&main, config)?];

    for (uid, flagged) in &group.members {
        if !*flagged {
            continue;
        }
        let mut record = VCard::with_version(config.version);
        record.add_property(VCardProperty::uri(names::UID, uid));
        record.add_property(VCardProperty::text(names::FN, uid));
        records.push(record);
    }

    Ok(records)
}

// --- name -----------------------------------------------------------------

fn emit_name(
    card: &Card,
    localized: &BTreeMap<String, Card>,
    default_language: Option<&str>,
    alloc: &mut AltidAllocator,
    record: &mut VCard,
) {
    let Some(name) = &card.name else {
        return;
    };

    let languages = order_languages(variant_languages(card, "name"), default_language);
    let altid = (!languages.is_empty()).then(|| alloc.allocate());

    // FN carries the free-text name; fall back to joining the components so
    // the record keeps a formatted name either way.
    if let Some(full) = formatted_name(name) {
        push_variants(
            record,
            VCardProperty::text(names::FN, full),
            altid.as_deref(),
            &languages,
            |lang| {
                localized
                    .get(lang)
                    .and_then(|c| c.name.as_ref())
                    .and_then(formatted_name)
                    .map(|full| VCardProperty::text(names::FN, full))
            },
        );
    }

    if !name.components.is_empty() {
        push_variants(
            record,
            structured_name_property(name),
            altid.as_deref(),
            &languages,
            |lang| {
                localized
                    .get(lang)
                    .and_then(|c| c.name.as_ref())
                    .filter(|n| !n.components.is_empty())
                    .map(structured_name_property)
            },
        );
    }

    // Components the N positions cannot hold pass through losslessly.
    for (index, component) in name.components.iter().enumerate() {
        if let NameComponentKind::Extended(_) = component.kind
            && let Ok(value) = serde_json::to_value(component)
        {
            record.add_property(jsprop(&format!("name/components/{index}"), &value));
        }
    }
}

/// Emits a base property plus one variant per language, all sharing the
/// field's ALTID.
fn push_variants<F>(
    record: &mut VCard,
    base: VCardProperty,
    altid: Option<&str>,
    languages: &[&str],
    variant: F,
) where
    F: Fn(&str) -> Option<VCardProperty>,
{
    let mut base = base;
    if let Some(id) = altid {
        base.add_param(VCardParameter::altid(id));
    }
    record.add_property(base);

    for language in languages {
        if let Some(mut prop) = variant(language) {
            set_language(&mut prop, language);
            if let Some(id) = altid {
                prop.add_param(VCardParameter::altid(id));
            }
            record.add_property(prop);
        }
    }
}

fn formatted_name(name: &Name) -> Option<String> {
    if let Some(full) = &name.full {
        return Some(full.clone());
    }
    let joined = name
        .components
        .iter()
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn structured_name_property(name: &Name) -> VCardProperty {
    let structured = StructuredName {
        family: name.joined(&NameComponentKind::Surname),
        given: name.joined(&NameComponentKind::Given),
        additional: name.joined(&NameComponentKind::Given2),
        prefixes: name.joined(&NameComponentKind::Title),
        suffixes: name.joined(&NameComponentKind::Credential),
    };
    VCardProperty::new(names::N, VCardValue::StructuredName(structured), String::new())
}

// --- collection driver ----------------------------------------------------

/// Emits one collection: entities ordered by preference, variants grouped
/// under one ALTID per localized field, passthrough for entities with no
/// legacy counterpart.
#[expect(clippy::too_many_arguments)]
fn emit_collection<T, A, E>(
    card: &Card,
    localized: &BTreeMap<String, Card>,
    collection: &str,
    accessor: A,
    emit: E,
    alloc: &mut AltidAllocator,
    default_language: Option<&str>,
    record: &mut VCard,
    emitted_paths: &mut BTreeMap<String, usize>,
) -> RfcResult<()>
where
    T: serde::Serialize,
    A: Fn(&Card) -> &BTreeMap<String, T>,
    E: Fn(&T) -> Option<VCardProperty>,
{
    let entries = accessor(card);

    let mut emitted: Vec<(&String, &T, Option<VCardProperty>)> = entries
        .iter()
        .map(|(id, entity)| (id, entity, emit(entity)))
        .collect();
    emitted.sort_by(|(id_a, _, prop_a), (id_b, _, prop_b)| {
        super::order::pref_value_order(
            prop_a.as_ref().and_then(VCardProperty::pref),
            prop_b.as_ref().and_then(VCardProperty::pref),
        )
        .then_with(|| id_a.cmp(id_b))
    });

    for (id, entity, maybe_prop) in emitted {
        let path = format!("{collection}/{id}");

        let Some(base) = maybe_prop else {
            // No legacy counterpart for this entity; keep it as a
            // self-describing passthrough property.
            let value = serde_json::to_value(entity)?;
            record.add_property(jsprop(&path, &value));
            continue;
        };

        emitted_paths.insert(path.clone(), record.properties.len());

        let languages = order_languages(variant_languages(card, &path), default_language);
        let altid = (!languages.is_empty()).then(|| alloc.allocate());

        push_variants(record, base, altid.as_deref(), &languages, |lang| {
            localized
                .get(lang)
                .and_then(|c| accessor(c).get(id))
                .and_then(&emit)
        });
    }

    Ok(())
}

/// Languages whose overlay touches the given path (the path itself or
/// anything beneath it), in lexical order.
fn variant_languages<'a>(card: &'a Card, path: &str) -> Vec<&'a str> {
    let prefix = format!("{path}/");
    card.localizations
        .iter()
        .filter(|(_, entries)| {
            entries
                .keys()
                .any(|p| p == path || p.starts_with(&prefix))
        })
        .map(|(language, _)| language.as_str())
        .collect()
}

/// Puts the configured default language first; the rest stay lexical.
fn order_languages<'a>(mut languages: Vec<&'a str>, default_language: Option<&str>) -> Vec<&'a str> {
    if let Some(default) = default_language
        && let Some(pos) = languages
            .iter()
            .position(|l| l.eq_ignore_ascii_case(default))
    {
        let preferred = languages.remove(pos);
        languages.insert(0, preferred);
    }
    languages
}

fn set_language(prop: &mut VCardProperty, language: &str) {
    prop.params.retain(|p| p.name != params::LANGUAGE);
    prop.add_param(VCardParameter::language(language));
}

/// Applies the shared entity metadata: TYPE tokens in canonical order,
/// PREF, LANGUAGE, and the explicit legacy group label.
fn apply_meta(
    mut prop: VCardProperty,
    meta: &PropMeta,
    features: Option<&BTreeMap<crate::rfc::jscontact::PhoneFeature, bool>>,
) -> VCardProperty {
    let no_features = BTreeMap::new();
    let tokens = tokens::type_tokens(&meta.contexts, features.unwrap_or(&no_features));
    if !tokens.is_empty() {
        prop.add_param(VCardParameter::type_multi(tokens));
    }
    if let Some(pref) = meta.pref {
        prop.add_param(VCardParameter::pref(pref));
    }
    if let Some(language) = &meta.language {
        prop.add_param(VCardParameter::language(language));
    }
    if let Some(group) = &meta.group {
        prop.group = Some(group.clone());
    }
    prop
}

// --- per-type emitters ----------------------------------------------------

fn emit_phone(phone: &Phone) -> Option<VCardProperty> {
    let prop = if phone.number.starts_with("tel:") {
        VCardProperty::uri(names::TEL, &phone.number)
    } else {
        VCardProperty::text(names::TEL, &phone.number)
    };
    Some(apply_meta(prop, &phone.meta, Some(&phone.features)))
}

fn emit_email(email: &EmailAddress) -> Option<VCardProperty> {
    let prop = VCardProperty::text(names::EMAIL, &email.address);
    Some(apply_meta(prop, &email.meta, None))
}

fn emit_address(address: &NativeAddress) -> Option<VCardProperty> {
    let single = |field: &Option<String>| field.clone().map_or_else(Vec::new, |v| vec![v]);

    let structured = Address {
        po_box: single(&address.po_box),
        extended: single(&address.extended),
        street: single(&address.street),
        locality: single(&address.locality),
        region: single(&address.region),
        postal_code: single(&address.postcode),
        country: single(&address.country),
    };

    let mut prop = VCardProperty::new(names::ADR, VCardValue::Address(structured), String::new());
    if let Some(full) = &address.full {
        prop.add_param(VCardParameter::new("LABEL", full));
    }
    Some(apply_meta(prop, &address.meta, None))
}

fn emit_resource(resource: &Resource) -> Option<VCardProperty> {
    let name = resource_property_name(&resource.label);
    let mut prop = VCardProperty::uri(name, &resource.uri);
    if let Some(media_type) = &resource.media_type {
        prop.add_param(VCardParameter::mediatype(media_type));
    }
    Some(apply_meta(prop, &resource.meta, None))
}

/// Recognized labels map to dedicated properties; anything else becomes a
/// vendor property named after the label, uppercased.
fn resource_property_name(label: &ResourceLabel) -> String {
    match label {
        ResourceLabel::Source => names::SOURCE.to_string(),
        ResourceLabel::Photo => names::PHOTO.to_string(),
        ResourceLabel::Logo => names::LOGO.to_string(),
        ResourceLabel::Sound => names::SOUND.to_string(),
        ResourceLabel::Url => names::URL.to_string(),
        ResourceLabel::Key => names::KEY.to_string(),
        ResourceLabel::ContactUri => names::CONTACT_URI.to_string(),
        ResourceLabel::FbUrl => names::FBURL.to_string(),
        ResourceLabel::CalAdrUri => names::CALADRURI.to_string(),
        ResourceLabel::CalUri => names::CALURI.to_string(),
        ResourceLabel::Extended(label) => format!("X-{}", label.to_ascii_uppercase()),
    }
}

fn emit_organization(org: &Organization) -> Option<VCardProperty> {
    let structured = LegacyOrganization {
        name: org.name.clone(),
        units: org.units.clone(),
    };
    let mut prop = VCardProperty::new(
        names::ORG,
        VCardValue::Organization(structured),
        String::new(),
    );
    if let Some(sort_as) = &org.sort_as {
        prop.add_param(VCardParameter::sort_as(sort_as));
    }
    Some(apply_meta(prop, &org.meta, None))
}

fn emit_title(title: &Title) -> Option<VCardProperty> {
    let prop = VCardProperty::text(names::TITLE, &title.name);
    Some(apply_meta(prop, &title.meta, None))
}

fn emit_note(note: &Note) -> Option<VCardProperty> {
    let prop = VCardProperty::text(names::NOTE, &note.note);
    Some(apply_meta(prop, &note.meta, None))
}

fn emit_nickname(nickname: &Nickname) -> Option<VCardProperty> {
    let prop = VCardProperty::new(
        names::NICKNAME,
        VCardValue::TextList(vec![nickname.name.clone()]),
        nickname.name.clone(),
    );
    Some(apply_meta(prop, &nickname.meta, None))
}

fn emit_anniversary(anniversary: &Anniversary) -> Option<VCardProperty> {
    let name = match &anniversary.kind {
        AnniversaryKind::Birth => names::BDAY,
        AnniversaryKind::Death => names::DEATHDATE,
        AnniversaryKind::Wedding => names::ANNIVERSARY,
        // No dedicated legacy property; the driver passes the whole entity
        // through.
        AnniversaryKind::Extended(_) => return None,
    };
    let prop = VCardProperty::new(
        name,
        VCardValue::Date(anniversary.date),
        anniversary.date.format("%Y%m%d").to_string(),
    );
    Some(apply_meta(prop, &anniversary.meta, None))
}

fn emit_personal_info(info: &PersonalInfo) -> Option<VCardProperty> {
    let name = match &info.kind {
        PersonalInfoKind::Expertise => names::EXPERTISE,
        PersonalInfoKind::Hobby => names::HOBBY,
        PersonalInfoKind::Interest => names::INTEREST,
        PersonalInfoKind::Extended(_) => return None,
    };
    let mut prop = VCardProperty::text(name, &info.value);
    if let Some(level) = &info.level {
        prop.add_param(VCardParameter::level(level.as_token()));
    }
    Some(apply_meta(prop, &info.meta, None))
}

fn emit_relation(relation: &Relation) -> Option<VCardProperty> {
    let mut prop = match (&relation.uri, &relation.text) {
        (Some(uri), _) => VCardProperty::uri(names::RELATED, uri),
        (None, Some(text)) => VCardProperty::text(names::RELATED, text)
            .with_param(VCardParameter::value_type("text")),
        // Validation rejects this shape; emit an empty text value so
        // lenient conversion still produces something inspectable.
        (None, None) => VCardProperty::text(names::RELATED, ""),
    };

    let relation_tokens: Vec<String> = relation
        .relation
        .iter()
        .filter(|(_, flagged)| **flagged)
        .map(|(kind, _)| kind.as_token().to_string())
        .collect();
    if !relation_tokens.is_empty() {
        prop.add_param(VCardParameter::type_multi(relation_tokens));
    }

    Some(apply_meta(prop, &relation.meta, None))
}

// --- passthrough ----------------------------------------------------------

/// Builds the generic passthrough property: JSPTR names the origin path,
/// the payload is plain text for strings (tagged `VALUE=text`) and JSON
/// text otherwise.
fn jsprop(path: &str, value: &Value) -> VCardProperty {
    let prop = match value {
        Value::String(s) => VCardProperty::text(names::JSPROP, s)
            .with_param(VCardParameter::value_type("text")),
        other => VCardProperty::text(names::JSPROP, other.to_string()),
    };
    prop.with_param(VCardParameter::jsptr(path))
}

/// Serializes the passthrough bucket: retained parameters reattach to the
/// property they came from, extensions keyed by a legacy property name get
/// that property back, and everything else becomes a JSPROP property.
fn emit_extensions(card: &Card, emitted_paths: &BTreeMap<String, usize>, record: &mut VCard) {
    // Grows as legacy-named extensions are re-emitted, so their retained
    // parameters (sorted after them) can reattach.
    let mut paths = emitted_paths.clone();

    for (key, value) in &card.extensions {
        if let Some((entity_path, param_name)) = split_param_key(key)
            && let Some(&index) = paths.get(entity_path)
        {
            let values = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), String::from))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            record.properties[index].add_param(VCardParameter::multi(param_name, values));
            continue;
        }

        if is_legacy_name(key) {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            paths.insert(key.clone(), record.properties.len());
            record.add_property(VCardProperty::new(
                key.clone(),
                VCardValue::Unknown(raw.clone()),
                raw,
            ));
            continue;
        }

        tracing::debug!(key, "passing native extension through as JSPROP");
        record.add_property(jsprop(key, value));
    }
}

/// An extension key that is itself a legacy property name (an unmatched
/// property retained by the reverse conversion).
fn is_legacy_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
}

/// Splits `<collection>/<id>/vcardParams/<name>` keys.
fn split_param_key(key: &str) -> Option<(&str, &str)> {
    let (entity_path, param_name) = key.rsplit_once("/vcardParams/")?;
    (!entity_path.is_empty() && !param_name.is_empty()).then_some((entity_path, param_name))
}
