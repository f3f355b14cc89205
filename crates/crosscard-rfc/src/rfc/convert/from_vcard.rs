//! Legacy → native conversion.
//!
//! Properties are grouped by name, then by ALTID (absent ALTID means a
//! singleton group). Each group becomes one native collection entry: the
//! language-free member (or the first) is the base value, every other member
//! contributes overlay entries for its language via the structural diff.
//! Properties with no conversion rule degrade to extensions, never to loss.

use std::collections::BTreeMap;

use crosscard_core::ConversionConfig;
use serde_json::Value;

use super::tokens;
use crate::error::{RfcError, RfcResult};
use crate::rfc::jscontact::properties::Address as NativeAddress;
use crate::rfc::jscontact::{
    Anniversary, AnniversaryKind, Card, CardGroup, CardKind, Context, EmailAddress, Name,
    NameComponent, NameComponentKind, Nickname, Note, ObjectType, Organization, OverlayEntries,
    PersonalInfo, PersonalInfoKind, PersonalInfoLevel, Phone, PhoneFeature, PropMeta, Relation,
    RelationType, Resource, ResourceLabel, Title, localize,
};
use crate::rfc::vcard::core::parameter::names as params;
use crate::rfc::vcard::core::property::names;
use crate::rfc::vcard::core::{VCard, VCardProperty, VCardValue};

/// Parameters the converters consume; anything else is retained as an
/// extension entry so it survives the round trip.
const CONSUMED_PARAMS: &[&str] = &[
    params::ALTID,
    params::PREF,
    params::LANGUAGE,
    params::TYPE,
    params::VALUE,
    params::SORT_AS,
    params::LEVEL,
    params::MEDIATYPE,
    params::ENCODING,
    params::JSPTR,
    "LABEL",
];

/// Converts one legacy record into a native card.
///
/// ## Errors
/// Returns [`RfcError::Structural`] when the record has no UID; other
/// unmapped or malformed properties degrade to extensions instead of
/// failing the conversion.
pub fn from_vcard(vcard: &VCard, config: &ConversionConfig) -> RfcResult<Card> {
    config.check()?;

    let uid = vcard
        .uid()
        .ok_or_else(|| RfcError::Structural("legacy record has no UID property".to_string()))?;

    let mut card = Card::new(uid);

    for prop in &vcard.properties {
        match prop.name.as_str() {
            names::KIND => {
                if card.kind.is_none()
                    && let Some(text) = prop.value.as_text_or_uri()
                {
                    card.kind = Some(CardKind::from_token(&text.to_ascii_lowercase()));
                }
            }
            names::PRODID => {
                if card.prod_id.is_none() {
                    card.prod_id = prop.value.as_text_or_uri().map(String::from);
                }
            }
            names::REV => card.updated = prop.value.as_timestamp().or(card.updated),
            names::MEMBER => {
                if let Some(uri) = prop.value.as_text_or_uri() {
                    card.members.insert(uri.to_string(), true);
                }
            }
            _ => {}
        }
    }

    let groups = group_properties(vcard);
    let mut name_done = false;

    for group in &groups {
        match group.name {
            names::FN | names::N => {
                if !name_done {
                    assemble_name(&groups, &mut card)?;
                    name_done = true;
                }
            }
            names::ADR => convert_group(
                &mut card.addresses,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "addresses",
                "ADR",
                build_address,
            )?,
            names::TEL => convert_group(
                &mut card.phones,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "phones",
                "PHONE",
                build_phone,
            )?,
            names::EMAIL => convert_group(
                &mut card.emails,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "emails",
                "EMAIL",
                build_email,
            )?,
            names::ORG => convert_group(
                &mut card.organizations,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "organizations",
                "ORG",
                build_organization,
            )?,
            names::TITLE => convert_group(
                &mut card.titles,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "titles",
                "TITLE",
                build_title,
            )?,
            names::NOTE => convert_group(
                &mut card.notes,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "notes",
                "NOTE",
                build_note,
            )?,
            names::NICKNAME => convert_nicknames(&mut card, group)?,
            names::BDAY | names::DEATHDATE | names::ANNIVERSARY => {
                let kind = anniversary_kind(group.name);
                convert_group(
                    &mut card.anniversaries,
                    &mut card.localizations,
                    &mut card.extensions,
                    group,
                    "anniversaries",
                    "ANNIVERSARY",
                    |p| build_anniversary(p, kind.clone()),
                )?;
            }
            names::EXPERTISE | names::HOBBY | names::INTEREST => {
                let kind = personal_info_kind(group.name);
                convert_group(
                    &mut card.personal_info,
                    &mut card.localizations,
                    &mut card.extensions,
                    group,
                    "personalInfo",
                    "PERSINFO",
                    |p| build_personal_info(p, kind.clone()),
                )?;
            }
            names::RELATED => convert_group(
                &mut card.relations,
                &mut card.localizations,
                &mut card.extensions,
                group,
                "relations",
                "RELATION",
                build_relation,
            )?,
            names::SOURCE | names::PHOTO | names::LOGO | names::SOUND | names::URL | names::KEY
            | names::FBURL | names::CALADRURI | names::CALURI | names::CONTACT_URI => {
                let label = resource_label(group.name);
                convert_group(
                    &mut card.online,
                    &mut card.localizations,
                    &mut card.extensions,
                    group,
                    "online",
                    "LINK",
                    |p| build_resource(p, label.clone()),
                )?;
            }
            names::JSPROP => {
                for prop in &group.members {
                    retain_jsprop(&mut card, prop);
                }
            }
            _ => {
                for prop in &group.members {
                    retain_unknown(&mut card, prop);
                }
            }
        }
    }

    Ok(card)
}

fn anniversary_kind(name: &str) -> AnniversaryKind {
    match name {
        names::BDAY => AnniversaryKind::Birth,
        names::DEATHDATE => AnniversaryKind::Death,
        _ => AnniversaryKind::Wedding,
    }
}

fn personal_info_kind(name: &str) -> PersonalInfoKind {
    match name {
        names::EXPERTISE => PersonalInfoKind::Expertise,
        names::HOBBY => PersonalInfoKind::Hobby,
        _ => PersonalInfoKind::Interest,
    }
}

/// Converts a list of independent records.
///
/// ## Errors
/// Fails on the first record with a structural problem; no partial output.
pub fn from_vcards(records: &[VCard], config: &ConversionConfig) -> RfcResult<Vec<Card>> {
    records.iter().map(|r| from_vcard(r, config)).collect()
}

/// Converts a member-linked record set into a [`CardGroup`] plus the
/// member cards.
///
/// The main record is the one carrying MEMBER references (or group kind);
/// member uris it names stay in the group even when no matching record is
/// present, because member lifecycles are independent.
///
/// ## Errors
/// Returns [`RfcError::Structural`] when no record qualifies as the group
/// record.
pub fn group_from_vcards(
    records: &[VCard],
    config: &ConversionConfig,
) -> RfcResult<(CardGroup, Vec<Card>)> {
    let cards = from_vcards(records, config)?;

    let main_index = cards
        .iter()
        .position(|c| !c.members.is_empty() || c.kind == Some(CardKind::Group))
        .ok_or_else(|| {
            RfcError::Structural("no record carries MEMBER references or group kind".to_string())
        })?;

    let mut members_cards = cards;
    let main = members_cards.remove(main_index);
    let members = main.members.clone();

    let mut group = CardGroup::new(main);
    group.members = members;
    Ok((group, members_cards))
}

// --- grouping -------------------------------------------------------------

struct PropertyGroup<'a> {
    name: &'a str,
    altid: Option<&'a str>,
    members: Vec<&'a VCardProperty>,
}

impl PropertyGroup<'_> {
    /// The language-free member, or the first one.
    fn base(&self) -> &VCardProperty {
        self.members
            .iter()
            .find(|p| p.language().is_none())
            .unwrap_or(&self.members[0])
    }

    /// Members other than the base, with the language each carries.
    fn variants(&self) -> impl Iterator<Item = (&str, &VCardProperty)> {
        let base: *const VCardProperty = self.base();
        self.members
            .iter()
            .filter(move |p| !std::ptr::eq(**p as *const VCardProperty, base))
            .filter_map(|p| p.language().map(|lang| (lang, *p)))
    }
}

/// Groups properties by name, then by ALTID; a property without an ALTID
/// always forms its own group.
fn group_properties(vcard: &VCard) -> Vec<PropertyGroup<'_>> {
    const HANDLED_ELSEWHERE: &[&str] = &[
        names::UID,
        names::KIND,
        names::PRODID,
        names::REV,
        names::MEMBER,
    ];

    let mut groups: Vec<PropertyGroup<'_>> = Vec::new();

    for prop in &vcard.properties {
        if HANDLED_ELSEWHERE.contains(&prop.name.as_str()) {
            continue;
        }

        match prop.altid() {
            Some(altid) => {
                if let Some(group) = groups
                    .iter_mut()
                    .find(|g| g.name == prop.name && g.altid == Some(altid))
                {
                    group.members.push(prop);
                } else {
                    groups.push(PropertyGroup {
                        name: &prop.name,
                        altid: Some(altid),
                        members: vec![prop],
                    });
                }
            }
            None => groups.push(PropertyGroup {
                name: &prop.name,
                altid: None,
                members: vec![prop],
            }),
        }
    }

    groups
}

// --- name -----------------------------------------------------------------

/// Merges the FN and N groups into the single `name` field; language
/// variants become `name/…` overlay entries.
fn assemble_name(groups: &[PropertyGroup<'_>], card: &mut Card) -> RfcResult<()> {
    let mut name = Name {
        object_type: Some(ObjectType::Name),
        ..Name::default()
    };

    let mut fn_groups = groups.iter().filter(|g| g.name == names::FN);
    if let Some(group) = fn_groups.next() {
        let base = group.base();
        name.full = base.as_text().map(String::from);

        for (language, prop) in group.variants() {
            if let Some(text) = prop.as_text() {
                card.add_localization(language, "name/full", Value::String(text.to_string()));
            }
        }
    }
    // A record with several unrelated FN fields is malformed; keep the
    // extras rather than dropping them.
    for group in fn_groups {
        for prop in &group.members {
            retain_raw(&mut card.extensions, prop);
        }
    }

    if let Some(group) = groups.iter().find(|g| g.name == names::N) {
        let base = group.base();
        if let Some(structured) = base.value.as_structured_name() {
            name.components = components_from_structured(structured);
        }

        let base_json = serde_json::to_value(&name.components)?;
        for (language, prop) in group.variants() {
            let Some(structured) = prop.value.as_structured_name() else {
                continue;
            };
            let variant_json = serde_json::to_value(components_from_structured(structured))?;
            for (path, value) in
                localize::extract_overlay(&variant_json, &base_json, "name/components")
            {
                card.add_localization(language, path, value);
            }
        }
    }

    if !name.is_empty() {
        card.name = Some(name);
    }
    Ok(())
}

fn components_from_structured(
    structured: &crate::rfc::vcard::core::StructuredName,
) -> Vec<NameComponent> {
    let mut components = Vec::new();
    let mut push = |kind: NameComponentKind, values: &[String]| {
        for value in values {
            components.push(NameComponent::new(kind.clone(), value));
        }
    };

    push(NameComponentKind::Title, &structured.prefixes);
    push(NameComponentKind::Given, &structured.given);
    push(NameComponentKind::Given2, &structured.additional);
    push(NameComponentKind::Surname, &structured.family);
    push(NameComponentKind::Credential, &structured.suffixes);
    components
}

// --- generic group conversion ---------------------------------------------

/// Converts one property group into one collection entry plus overlay
/// entries for its language variants. A property the builder cannot
/// interpret is retained as an extension instead.
fn convert_group<T, B>(
    collection: &mut BTreeMap<String, T>,
    localizations: &mut BTreeMap<String, OverlayEntries>,
    extensions: &mut BTreeMap<String, Value>,
    group: &PropertyGroup<'_>,
    collection_path: &str,
    id_prefix: &str,
    build: B,
) -> RfcResult<()>
where
    T: serde::Serialize,
    B: Fn(&VCardProperty) -> Option<T>,
{
    let base_prop = group.base();
    let Some(base_entity) = build(base_prop) else {
        tracing::debug!(name = group.name, "property did not map; retained as extension");
        retain_raw(extensions, base_prop);
        return Ok(());
    };

    let base_json = serde_json::to_value(&base_entity)?;
    let id = insert_entity(collection, id_prefix, base_entity);
    let entity_path = format!("{collection_path}/{id}");

    retain_params(extensions, &entity_path, base_prop);

    for (language, prop) in group.variants() {
        let Some(variant_entity) = build(prop) else {
            continue;
        };
        let variant_json = serde_json::to_value(&variant_entity)?;
        for (path, value) in localize::extract_overlay(&variant_json, &base_json, &entity_path) {
            // The variant's LANGUAGE parameter is already carried by the
            // overlay key itself.
            if path.ends_with("/language") && value.as_str() == Some(language) {
                continue;
            }
            localizations
                .entry(language.to_string())
                .or_default()
                .insert(path, value);
        }
    }

    // Same-name members with neither the base slot nor a language become
    // their own singleton entities.
    for prop in &group.members {
        if !std::ptr::eq(*prop, base_prop) && prop.language().is_none() {
            if let Some(extra) = build(prop) {
                let extra_id = insert_entity(collection, id_prefix, extra);
                retain_params(extensions, &format!("{collection_path}/{extra_id}"), prop);
            } else {
                retain_raw(extensions, prop);
            }
        }
    }

    Ok(())
}

/// Inserts a built entity under the next free `PREFIX-n` id of its
/// collection.
fn insert_entity<T>(collection: &mut BTreeMap<String, T>, id_prefix: &str, entity: T) -> String {
    let mut n = collection.len() + 1;
    let mut id = format!("{id_prefix}-{n}");
    while collection.contains_key(&id) {
        n += 1;
        id = format!("{id_prefix}-{n}");
    }
    collection.insert(id.clone(), entity);
    id
}

/// Retains parameters the conversion did not consume.
fn retain_params(
    extensions: &mut BTreeMap<String, Value>,
    entity_path: &str,
    prop: &VCardProperty,
) {
    for param in &prop.params {
        if CONSUMED_PARAMS.contains(&param.name.as_str()) {
            continue;
        }
        let value = match param.values.len() {
            1 => Value::String(param.values[0].clone()),
            _ => Value::Array(
                param
                    .values
                    .iter()
                    .map(|v| Value::String(v.clone()))
                    .collect(),
            ),
        };
        extensions.insert(format!("{entity_path}/vcardParams/{}", param.name), value);
    }
}

/// Retains a property's logical value in the extension bucket.
fn retain_raw(extensions: &mut BTreeMap<String, Value>, prop: &VCardProperty) {
    let text = prop
        .value
        .as_text_or_uri()
        .unwrap_or(&prop.raw_value)
        .to_string();
    extensions.insert(prop.name.clone(), Value::String(text));
}

// --- per-type builders ----------------------------------------------------

fn meta_from(prop: &VCardProperty, contexts: BTreeMap<Context, bool>) -> PropMeta {
    PropMeta {
        contexts,
        pref: prop.pref(),
        language: prop.language().map(String::from),
        group: prop.group.clone(),
    }
}

/// Contexts from TYPE tokens, with unrecognized tokens kept as extended
/// context flags.
fn contexts_with_leftovers(prop: &VCardProperty) -> BTreeMap<Context, bool> {
    let (mut contexts, leftovers) = tokens::partition(&prop.type_tokens());
    for token in leftovers {
        contexts.insert(Context::Extended(token), true);
    }
    contexts
}

fn build_phone(prop: &VCardProperty) -> Option<Phone> {
    let number = prop.value.as_text_or_uri()?;
    let (contexts, leftovers) = tokens::partition(&prop.type_tokens());

    let mut phone = Phone::new(number);
    phone.meta = meta_from(prop, contexts);
    for token in leftovers {
        phone.features.insert(PhoneFeature::from_token(&token), true);
    }
    Some(phone)
}

fn build_email(prop: &VCardProperty) -> Option<EmailAddress> {
    let address = prop.value.as_text_or_uri()?;
    let mut email = EmailAddress::new(address);
    email.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(email)
}

fn build_address(prop: &VCardProperty) -> Option<NativeAddress> {
    let structured = prop.value.as_address()?;
    let single = |parts: &[String]| {
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    };

    let mut address = NativeAddress::new();
    address.po_box = single(&structured.po_box);
    address.extended = single(&structured.extended);
    address.street = single(&structured.street);
    address.locality = single(&structured.locality);
    address.region = single(&structured.region);
    address.postcode = single(&structured.postal_code);
    address.country = single(&structured.country);
    address.full = prop.get_param_value("LABEL").map(String::from);
    address.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(address)
}

fn build_organization(prop: &VCardProperty) -> Option<Organization> {
    let structured = prop.value.as_organization()?;
    let mut org = Organization::new(&structured.name);
    org.units = structured.units.clone();
    org.sort_as = prop.get_param_value(params::SORT_AS).map(String::from);
    org.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(org)
}

fn build_title(prop: &VCardProperty) -> Option<Title> {
    let mut title = Title::new(prop.as_text()?);
    title.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(title)
}

fn build_note(prop: &VCardProperty) -> Option<Note> {
    let mut note = Note::new(prop.as_text()?);
    note.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(note)
}

fn build_anniversary(prop: &VCardProperty, kind: AnniversaryKind) -> Option<Anniversary> {
    let date = prop
        .value
        .as_date()
        .or_else(|| crate::rfc::vcard::parse::parse_date(&prop.raw_value, 0).ok())?;
    let mut anniversary = Anniversary::new(kind, date);
    anniversary.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(anniversary)
}

fn build_personal_info(prop: &VCardProperty, kind: PersonalInfoKind) -> Option<PersonalInfo> {
    let mut info = PersonalInfo::new(kind, prop.as_text()?);
    info.level = prop
        .get_param_value(params::LEVEL)
        .map(|level| PersonalInfoLevel::from_token(&level.to_ascii_lowercase()));
    info.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(info)
}

fn build_relation(prop: &VCardProperty) -> Option<Relation> {
    let mut relation = match &prop.value {
        VCardValue::Uri(uri) => Relation::to_uri(uri),
        other => Relation::to_text(other.as_text()?),
    };

    let (contexts, leftovers) = tokens::partition(&prop.type_tokens());
    for token in leftovers {
        relation.relation.insert(RelationType::from_token(&token), true);
    }
    relation.meta = meta_from(prop, contexts);
    Some(relation)
}

fn build_resource(prop: &VCardProperty, label: ResourceLabel) -> Option<Resource> {
    let uri = prop.value.as_text_or_uri()?;
    let mut resource = Resource::new(label, uri);
    resource.media_type = prop.get_param_value(params::MEDIATYPE).map(String::from);
    resource.meta = meta_from(prop, contexts_with_leftovers(prop));
    Some(resource)
}

fn resource_label(name: &str) -> ResourceLabel {
    match name {
        names::SOURCE => ResourceLabel::Source,
        names::PHOTO => ResourceLabel::Photo,
        names::LOGO => ResourceLabel::Logo,
        names::SOUND => ResourceLabel::Sound,
        names::URL => ResourceLabel::Url,
        names::KEY => ResourceLabel::Key,
        names::CONTACT_URI => ResourceLabel::ContactUri,
        names::FBURL => ResourceLabel::FbUrl,
        names::CALADRURI => ResourceLabel::CalAdrUri,
        names::CALURI => ResourceLabel::CalUri,
        other => ResourceLabel::Extended(other.to_ascii_lowercase()),
    }
}

// --- nicknames ------------------------------------------------------------

/// NICKNAME carries a comma-separated list; each item becomes its own
/// entity. Language variants apply only to single-item groups, where the
/// pairing is unambiguous.
fn convert_nicknames(card: &mut Card, group: &PropertyGroup<'_>) -> RfcResult<()> {
    let base_prop = group.base();
    let items: Vec<String> = match &base_prop.value {
        VCardValue::TextList(items) => items.clone(),
        other => match other.as_text() {
            Some(text) => vec![text.to_string()],
            None => {
                retain_raw(&mut card.extensions, base_prop);
                return Ok(());
            }
        },
    };

    let single_item = items.len() == 1;
    for item in items {
        let mut nickname = Nickname::new(item);
        nickname.meta = meta_from(base_prop, contexts_with_leftovers(base_prop));
        let base_json = serde_json::to_value(&nickname)?;
        let id = insert_entity(&mut card.nicknames, "NICK", nickname);

        if single_item {
            retain_params(&mut card.extensions, &format!("nicknames/{id}"), base_prop);
            for (language, prop) in group.variants() {
                let Some(text) = first_text(prop) else {
                    continue;
                };
                let mut variant = Nickname::new(text);
                variant.meta = meta_from(prop, contexts_with_leftovers(prop));
                let variant_json = serde_json::to_value(&variant)?;
                for (path, value) in localize::extract_overlay(
                    &variant_json,
                    &base_json,
                    &format!("nicknames/{id}"),
                ) {
                    if path.ends_with("/language") && value.as_str() == Some(language) {
                        continue;
                    }
                    card.add_localization(language, path, value);
                }
            }
        }
    }

    Ok(())
}

fn first_text(prop: &VCardProperty) -> Option<String> {
    match &prop.value {
        VCardValue::TextList(items) => items.first().cloned(),
        other => other.as_text().map(String::from),
    }
}

// --- passthrough ----------------------------------------------------------

/// Reconstructs a native extension from a JSPROP passthrough property.
fn retain_jsprop(card: &mut Card, prop: &VCardProperty) {
    let key = prop
        .get_param_value(params::JSPTR)
        .unwrap_or(names::JSPROP)
        .to_string();
    let raw = prop.as_text().unwrap_or(&prop.raw_value);

    let is_plain_text = prop
        .get_param_value(params::VALUE)
        .is_some_and(|v| v.eq_ignore_ascii_case("text"));
    let value = if is_plain_text {
        Value::String(raw.to_string())
    } else {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    };

    card.extensions.insert(key, value);
}

/// Retains a property with no conversion rule: vendor URI properties come
/// back as labeled resources, everything else lands in the extension
/// bucket byte-for-byte.
fn retain_unknown(card: &mut Card, prop: &VCardProperty) {
    if prop.name.starts_with("X-")
        && let VCardValue::Uri(uri) = &prop.value
    {
        let label = ResourceLabel::Extended(prop.name[2..].to_ascii_lowercase());
        let mut resource = Resource::new(label, uri);
        resource.media_type = prop.get_param_value(params::MEDIATYPE).map(String::from);
        resource.meta = meta_from(prop, contexts_with_leftovers(prop));
        let id = insert_entity(&mut card.online, "LINK", resource);
        retain_params(&mut card.extensions, &format!("online/{id}"), prop);
        return;
    }

    tracing::debug!(name = %prop.name, "retaining unmatched property as extension");
    let name = prop.name.clone();
    retain_raw(&mut card.extensions, prop);
    retain_params(&mut card.extensions, &name, prop);
}
