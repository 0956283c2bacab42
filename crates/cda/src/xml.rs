//! CDA XML serialisation of a component tree.
//!
//! Element names and ordering follow the CDA R2 schema (for example `observation` writes `id`,
//! `code`, `text`, `statusCode`, `effectiveTime`, `value`, `interpretationCode`, `methodCode`,
//! `targetSiteCode`, `specimen`, `participant`, `entryRelationship`, `referenceRange` in that
//! order). Nothing is validated; the tree is written as given.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::constants::{EXT_NS, HL7_V3_NS, XSI_NS};
use crate::data_types::{
    AnyValue, ConceptDescriptor, EffectiveTime, Identifier, Interval, PhysicalQuantity,
    QuantityInterval,
};
use crate::document::{
    Act, ActClass, ClinicalStatement, Component, EntryRelationship, Observation, Organizer,
    Participant, ReferenceRange, Section, Specimen, SubstanceAdministration,
};
use crate::narrative::{NarrativeBlock, StrucDocTable, StrucDocText};
use crate::{CdaError, CdaResult};

fn write_err(err: impl std::fmt::Display) -> CdaError {
    CdaError::XmlWrite(err.to_string())
}

/// Thin wrapper over the `quick-xml` writer so every call site maps errors the same way.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        start
    }

    fn decl(&mut self) -> CdaResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_err)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> CdaResult<()> {
        self.writer
            .write_event(Event::Start(Self::element(name, attrs)))
            .map_err(write_err)
    }

    fn end(&mut self, name: &str) -> CdaResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(write_err)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> CdaResult<()> {
        self.writer
            .write_event(Event::Empty(Self::element(name, attrs)))
            .map_err(write_err)
    }

    fn text_element(&mut self, name: &str, text: &str) -> CdaResult<()> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_err)?;
        self.end(name)
    }

    fn finish(self) -> CdaResult<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|_| CdaError::InvalidText)
    }
}

/// Serialise a component as an indented XML fragment rooted at `<component>`.
pub fn component_to_xml(component: &Component) -> CdaResult<String> {
    let mut out = XmlOut::new();
    out.decl()?;
    out.start(
        "component",
        &[
            ("xmlns", HL7_V3_NS),
            ("xmlns:xsi", XSI_NS),
            ("xmlns:ext", EXT_NS),
        ],
    )?;
    write_section(&mut out, &component.section)?;
    out.end("component")?;
    out.finish()
}

fn write_component(out: &mut XmlOut, component: &Component) -> CdaResult<()> {
    out.start("component", &[])?;
    write_section(out, &component.section)?;
    out.end("component")
}

fn write_section(out: &mut XmlOut, section: &Section) -> CdaResult<()> {
    out.start("section", &[])?;
    write_identifier(out, "id", &section.id)?;
    write_cd(out, "code", &section.code, &[])?;
    out.text_element("title", section.title.as_str())?;
    write_narrative(out, &section.text)?;
    for entry in &section.entries {
        out.start("entry", &[])?;
        write_statement(out, &entry.statement)?;
        out.end("entry")?;
    }
    for component in &section.components {
        write_component(out, component)?;
    }
    out.end("section")
}

fn write_narrative(out: &mut XmlOut, text: &StrucDocText) -> CdaResult<()> {
    if text.is_empty() {
        return out.empty("text", &[]);
    }
    out.start("text", &[])?;
    for block in &text.blocks {
        match block {
            NarrativeBlock::Paragraph(p) => out.text_element("paragraph", p)?,
            NarrativeBlock::List(items) => {
                out.start("list", &[])?;
                for item in items {
                    out.text_element("item", item)?;
                }
                out.end("list")?;
            }
            NarrativeBlock::Table(table) => write_table(out, table)?,
        }
    }
    out.end("text")
}

fn write_table(out: &mut XmlOut, table: &StrucDocTable) -> CdaResult<()> {
    out.start("table", &[])?;
    if let Some(caption) = &table.caption {
        out.text_element("caption", caption)?;
    }
    if !table.headers.is_empty() {
        out.start("thead", &[])?;
        out.start("tr", &[])?;
        for header in &table.headers {
            out.text_element("th", header)?;
        }
        out.end("tr")?;
        out.end("thead")?;
    }
    out.start("tbody", &[])?;
    for row in &table.rows {
        out.start("tr", &[])?;
        for cell in row {
            out.text_element("td", cell)?;
        }
        out.end("tr")?;
    }
    out.end("tbody")?;
    out.end("table")
}

fn write_statement(out: &mut XmlOut, statement: &ClinicalStatement) -> CdaResult<()> {
    match statement {
        ClinicalStatement::Observation(o) => write_observation(out, o),
        ClinicalStatement::Act(a) => write_act(out, a),
        ClinicalStatement::SubstanceAdministration(s) => write_substance_administration(out, s),
        ClinicalStatement::Organizer(o) => write_organizer(out, o),
    }
}

fn write_observation(out: &mut XmlOut, obs: &Observation) -> CdaResult<()> {
    out.start(
        "observation",
        &[
            ("classCode", ActClass::Observation.as_str()),
            ("moodCode", obs.mood_code.as_str()),
        ],
    )?;

    for id in &obs.ids {
        write_identifier(out, "id", id)?;
    }
    write_cd(out, "code", &obs.code, &[])?;
    if let Some(time) = &obs.effective_time {
        write_effective_time(out, time)?;
    }
    for value in &obs.values {
        write_value(out, value)?;
    }
    for code in &obs.interpretation_codes {
        write_cd(out, "interpretationCode", code, &[])?;
    }
    for code in &obs.method_codes {
        write_cd(out, "methodCode", code, &[])?;
    }
    for code in &obs.target_site_codes {
        write_cd(out, "targetSiteCode", code, &[])?;
    }
    for specimen in &obs.specimens {
        write_specimen(out, specimen)?;
    }
    for participant in &obs.participants {
        write_participant(out, participant)?;
    }
    write_entry_relationships(out, &obs.entry_relationships)?;
    for range in &obs.reference_ranges {
        write_reference_range(out, range)?;
    }
    out.end("observation")
}

fn write_act(out: &mut XmlOut, act: &Act) -> CdaResult<()> {
    out.start(
        "act",
        &[
            ("classCode", ActClass::Act.as_str()),
            ("moodCode", act.mood_code.as_str()),
        ],
    )?;

    for id in &act.ids {
        write_identifier(out, "id", id)?;
    }
    write_cd(out, "code", &act.code, &[])?;
    if let Some(text) = &act.text {
        out.text_element("text", text)?;
    }
    out.end("act")
}

fn write_substance_administration(
    out: &mut XmlOut,
    sbadm: &SubstanceAdministration,
) -> CdaResult<()> {
    let mut attrs = vec![
        ("classCode", ActClass::SubstanceAdministration.as_str()),
        ("moodCode", sbadm.mood_code.as_str()),
    ];
    if let Some(negated) = sbadm.negation_ind {
        attrs.push(("negationInd", if negated { "true" } else { "false" }));
    }
    out.start("substanceAdministration", &attrs)?;

    for id in &sbadm.ids {
        write_identifier(out, "id", id)?;
    }
    if let Some(text) = &sbadm.text {
        out.text_element("text", text)?;
    }
    out.start("consumable", &[])?;
    out.start("manufacturedProduct", &[])?;
    out.start("manufacturedMaterial", &[])?;
    write_cd(out, "code", &sbadm.consumable.manufactured_material, &[])?;
    out.end("manufacturedMaterial")?;
    out.end("manufacturedProduct")?;
    out.end("consumable")?;
    write_entry_relationships(out, &sbadm.entry_relationships)?;
    out.end("substanceAdministration")
}

fn write_organizer(out: &mut XmlOut, organizer: &Organizer) -> CdaResult<()> {
    out.start(
        "organizer",
        &[
            ("classCode", organizer.class_code.as_str()),
            ("moodCode", organizer.mood_code.as_str()),
        ],
    )?;
    for id in &organizer.ids {
        write_identifier(out, "id", id)?;
    }
    write_cd(out, "code", &organizer.code, &[])?;
    out.empty("statusCode", &[("code", organizer.status_code.as_str())])?;
    for component in &organizer.components {
        out.start("component", &[])?;
        write_statement(out, component)?;
        out.end("component")?;
    }
    out.end("organizer")
}

fn write_entry_relationships(
    out: &mut XmlOut,
    relationships: &[EntryRelationship],
) -> CdaResult<()> {
    for rel in relationships {
        out.start("entryRelationship", &[("typeCode", rel.type_code.as_str())])?;
        write_statement(out, &rel.statement)?;
        out.end("entryRelationship")?;
    }
    Ok(())
}

fn write_participant(out: &mut XmlOut, participant: &Participant) -> CdaResult<()> {
    out.start("participant", &[("typeCode", participant.type_code.as_str())])?;
    out.start("participantRole", &[("classCode", "MANU")])?;
    out.start("playingEntity", &[("classCode", "MMAT")])?;
    write_cd(out, "code", &participant.playing_entity_code, &[])?;
    out.end("playingEntity")?;
    out.end("participantRole")?;
    out.end("participant")
}

fn write_specimen(out: &mut XmlOut, specimen: &Specimen) -> CdaResult<()> {
    out.start("specimen", &[])?;
    out.start("specimenRole", &[])?;
    for id in &specimen.ids {
        write_identifier(out, "id", id)?;
    }
    if let Some(entity) = &specimen.playing_entity {
        out.start("specimenPlayingEntity", &[])?;
        if let Some(code) = &entity.code {
            write_cd(out, "code", code, &[])?;
        }
        for quantity in &entity.quantities {
            write_pq(out, "quantity", quantity, &[])?;
        }
        if let Some(desc) = &entity.desc {
            out.text_element("desc", desc)?;
        }
        out.end("specimenPlayingEntity")?;
    }
    if let Some(container) = &specimen.container_id {
        out.start("ext:asSpecimenInContainer", &[("classCode", "CONT")])?;
        out.start("ext:container", &[])?;
        write_identifier(out, "ext:id", container)?;
        out.end("ext:container")?;
        out.end("ext:asSpecimenInContainer")?;
    }
    if let Some(parent) = &specimen.parent_id {
        out.start("ext:specimenParent", &[])?;
        write_identifier(out, "ext:id", parent)?;
        out.end("ext:specimenParent")?;
    }
    out.end("specimenRole")?;
    out.end("specimen")
}

fn write_reference_range(out: &mut XmlOut, range: &ReferenceRange) -> CdaResult<()> {
    out.start("referenceRange", &[])?;
    out.start("observationRange", &[])?;
    if let Some(meaning) = &range.meaning {
        write_cd(out, "code", meaning, &[])?;
    }
    write_value(out, &range.value)?;
    out.end("observationRange")?;
    out.end("referenceRange")
}

fn write_identifier(out: &mut XmlOut, name: &str, id: &Identifier) -> CdaResult<()> {
    match &id.extension {
        Some(ext) => out.empty(name, &[("root", id.root.as_str()), ("extension", ext.as_str())]),
        None => out.empty(name, &[("root", id.root.as_str())]),
    }
}

fn write_cd(
    out: &mut XmlOut,
    name: &str,
    cd: &ConceptDescriptor,
    extra: &[(&str, &str)],
) -> CdaResult<()> {
    let mut attrs: Vec<(&str, &str)> = extra.to_vec();
    if cd.is_empty() {
        attrs.push(("nullFlavor", "NI"));
        return out.empty(name, &attrs);
    }
    let pairs = [
        ("code", &cd.code),
        ("codeSystem", &cd.code_system),
        ("codeSystemName", &cd.code_system_name),
        ("codeSystemVersion", &cd.code_system_version),
        ("displayName", &cd.display_name),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            attrs.push((key, value.as_str()));
        }
    }

    let has_children =
        cd.original_text.is_some() || !cd.qualifiers.is_empty() || !cd.translations.is_empty();
    if !has_children {
        return out.empty(name, &attrs);
    }

    out.start(name, &attrs)?;
    if let Some(text) = &cd.original_text {
        out.text_element("originalText", text)?;
    }
    for qualifier in &cd.qualifiers {
        out.start("qualifier", &[])?;
        write_cd(out, "name", &qualifier.name, &[])?;
        write_cd(out, "value", &qualifier.value, &[])?;
        out.end("qualifier")?;
    }
    for translation in &cd.translations {
        write_cd(out, "translation", translation, &[])?;
    }
    out.end(name)
}

fn write_pq(
    out: &mut XmlOut,
    name: &str,
    pq: &PhysicalQuantity,
    extra: &[(&str, &str)],
) -> CdaResult<()> {
    let mut attrs: Vec<(&str, &str)> = extra.to_vec();
    attrs.push(("value", pq.value.as_str()));
    if let Some(unit) = &pq.unit {
        attrs.push(("unit", unit.as_str()));
    }
    out.empty(name, &attrs)
}

fn write_ivl_pq(
    out: &mut XmlOut,
    name: &str,
    range: &QuantityInterval,
    extra: &[(&str, &str)],
) -> CdaResult<()> {
    out.start(name, extra)?;
    if let Some(low) = &range.low {
        write_pq(out, "low", low, &[])?;
    }
    if let Some(high) = &range.high {
        write_pq(out, "high", high, &[])?;
    }
    out.end(name)
}

fn write_interval(out: &mut XmlOut, name: &str, interval: &Interval) -> CdaResult<()> {
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(value) = &interval.value {
        attrs.push(("value", value.as_str()));
    }
    if interval.low.is_none() && interval.high.is_none() && interval.width.is_none() {
        return out.empty(name, &attrs);
    }
    out.start(name, &attrs)?;
    if let Some(low) = &interval.low {
        out.empty("low", &[("value", low.as_str())])?;
    }
    if let Some(high) = &interval.high {
        out.empty("high", &[("value", high.as_str())])?;
    }
    if let Some(width) = &interval.width {
        write_pq(out, "width", width, &[])?;
    }
    out.end(name)
}

fn write_effective_time(out: &mut XmlOut, time: &EffectiveTime) -> CdaResult<()> {
    match time {
        EffectiveTime::Timestamp(ts) => out.empty("effectiveTime", &[("value", ts.as_str())]),
        EffectiveTime::Interval(interval) => write_interval(out, "effectiveTime", interval),
    }
}

fn write_value(out: &mut XmlOut, value: &AnyValue) -> CdaResult<()> {
    let xsi = [("xsi:type", value.xsi_type())];
    match value {
        AnyValue::Coded(cd) => write_cd(out, "value", cd, &xsi),
        AnyValue::Quantity(pq) => write_pq(out, "value", pq, &xsi),
        AnyValue::QuantityRange(range) => write_ivl_pq(out, "value", range, &xsi),
        AnyValue::Text(text) => {
            out.start("value", &xsi)?;
            out.writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
            out.end("value")
        }
        AnyValue::Timestamp(ts) => out.empty("value", &[xsi[0], ("value", ts.as_str())]),
    }
}
