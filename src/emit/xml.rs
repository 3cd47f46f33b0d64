//! XML projection (all schema revisions).
//!
//! Writes events through `quick_xml::Writer` with two-space indentation.
//! The markup encoding predates the structured one: revisions 1.0 and 1.1
//! have no metadata block, no services, and no dependency section, so those
//! drop out silently for old targets.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};
use crate::model::{
    Bom, Component, ExternalReference, Hash, LicenseChoice, Licenses, Metadata,
    OrganizationalContact, OrganizationalEntity, Service, Standard, Tool, Vulnerability,
};
use crate::order::{sorted_clone, CanonicalOrder};
use crate::spec_version::{SchemaFeature, SpecVersion};

type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn render(bom: &Bom, version: SpecVersion) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("bom");
    root.push_attribute(("xmlns", version.xml_namespace().as_str()));
    if let Some(serial) = &bom.serial_number {
        root.push_attribute(("serialNumber", serial.as_str()));
    }
    root.push_attribute(("version", bom.version.to_string().as_str()));
    w.write_event(Event::Start(root))?;

    if version.supports(SchemaFeature::Metadata) {
        write_metadata(&mut w, &bom.metadata, version)?;
    }

    w.write_event(Event::Start(BytesStart::new("components")))?;
    for component in sorted_clone(&bom.components) {
        write_component(&mut w, &component, version)?;
    }
    w.write_event(Event::End(BytesEnd::new("components")))?;

    if !bom.services.is_empty() {
        if version.supports(SchemaFeature::Services) {
            w.write_event(Event::Start(BytesStart::new("services")))?;
            for service in sorted_clone(&bom.services) {
                write_service(&mut w, &service)?;
            }
            w.write_event(Event::End(BytesEnd::new("services")))?;
        } else {
            tracing::warn!(
                count = bom.services.len(),
                %version,
                "services have no encoding at this schema version, omitting"
            );
        }
    }

    if !bom.dependencies.is_empty() {
        if version.supports(SchemaFeature::Dependencies) {
            w.write_event(Event::Start(BytesStart::new("dependencies")))?;
            for (dependent, targets) in &bom.dependencies {
                let mut dep = BytesStart::new("dependency");
                dep.push_attribute(("ref", dependent.value()));
                if targets.is_empty() {
                    w.write_event(Event::Empty(dep))?;
                    continue;
                }
                w.write_event(Event::Start(dep))?;
                for target in targets {
                    let mut inner = BytesStart::new("dependency");
                    inner.push_attribute(("ref", target.value()));
                    w.write_event(Event::Empty(inner))?;
                }
                w.write_event(Event::End(BytesEnd::new("dependency")))?;
            }
            w.write_event(Event::End(BytesEnd::new("dependencies")))?;
        } else {
            tracing::warn!(
                count = bom.dependencies.len(),
                %version,
                "dependencies have no encoding at this schema version, omitting"
            );
        }
    }

    if !bom.vulnerabilities.is_empty() {
        if version.supports(SchemaFeature::Vulnerabilities) {
            w.write_event(Event::Start(BytesStart::new("vulnerabilities")))?;
            for vuln in sorted_clone(&bom.vulnerabilities) {
                write_vulnerability(&mut w, &vuln)?;
            }
            w.write_event(Event::End(BytesEnd::new("vulnerabilities")))?;
        } else {
            tracing::warn!(
                count = bom.vulnerabilities.len(),
                %version,
                "vulnerabilities have no encoding at this schema version, omitting"
            );
        }
    }

    if !bom.definitions.is_empty() {
        if version.supports(SchemaFeature::Definitions) {
            w.write_event(Event::Start(BytesStart::new("definitions")))?;
            w.write_event(Event::Start(BytesStart::new("standards")))?;
            for standard in sorted_clone(&bom.definitions) {
                write_standard(&mut w, &standard)?;
            }
            w.write_event(Event::End(BytesEnd::new("standards")))?;
            w.write_event(Event::End(BytesEnd::new("definitions")))?;
        } else {
            tracing::warn!(
                count = bom.definitions.len(),
                %version,
                "definitions have no encoding at this schema version, omitting"
            );
        }
    }

    w.write_event(Event::End(BytesEnd::new("bom")))?;
    String::from_utf8(w.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn text_elem(w: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn opt_text_elem(w: &mut XmlWriter, name: &str, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        text_elem(w, name, value)?;
    }
    Ok(())
}

fn write_metadata(w: &mut XmlWriter, metadata: &Metadata, version: SpecVersion) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new("metadata")))?;
    if let Some(timestamp) = metadata.timestamp_rfc3339() {
        text_elem(w, "timestamp", &timestamp)?;
    }
    if !metadata.tools.is_empty() {
        write_tools(w, metadata, version)?;
    }
    if !metadata.authors.is_empty() {
        w.write_event(Event::Start(BytesStart::new("authors")))?;
        for author in sorted_clone(&metadata.authors) {
            write_contact(w, "author", &author)?;
        }
        w.write_event(Event::End(BytesEnd::new("authors")))?;
    }
    if let Some(component) = &metadata.component {
        write_component(w, component, version)?;
    }
    if let Some(manufacture) = &metadata.manufacture {
        write_org(w, "manufacture", manufacture)?;
    }
    if let Some(supplier) = &metadata.supplier {
        write_org(w, "supplier", supplier)?;
    }
    if !metadata.licenses.is_empty() {
        if version.supports(SchemaFeature::MetadataLicenses) {
            write_licenses(w, &metadata.licenses)?;
        } else {
            tracing::warn!(
                %version,
                "metadata licenses have no encoding at this schema version, omitting"
            );
        }
    }
    w.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}

fn write_tools(w: &mut XmlWriter, metadata: &Metadata, version: SpecVersion) -> Result<()> {
    let tools = &metadata.tools;
    w.write_event(Event::Start(BytesStart::new("tools")))?;
    if version.supports(SchemaFeature::ToolComponents) {
        let (components, services) = tools.as_typed();
        if !components.is_empty() {
            w.write_event(Event::Start(BytesStart::new("components")))?;
            for component in &components {
                // Tool entities are not dependency targets; their refs stay
                // internal to the model and must not collide with document
                // refs the discriminator already settled.
                write_component_impl(w, component, version, false)?;
            }
            w.write_event(Event::End(BytesEnd::new("components")))?;
        }
        if !services.is_empty() {
            w.write_event(Event::Start(BytesStart::new("services")))?;
            for service in &services {
                write_service_impl(w, service, false)?;
            }
            w.write_event(Event::End(BytesEnd::new("services")))?;
        }
    } else {
        for tool in tools.as_legacy() {
            write_tool(w, &tool)?;
        }
    }
    w.write_event(Event::End(BytesEnd::new("tools")))?;
    Ok(())
}

fn write_tool(w: &mut XmlWriter, tool: &Tool) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new("tool")))?;
    opt_text_elem(w, "vendor", tool.vendor.as_deref())?;
    opt_text_elem(w, "name", tool.name.as_deref())?;
    opt_text_elem(w, "version", tool.version.as_deref())?;
    if !tool.hashes.is_empty() {
        write_hashes(w, &tool.hashes)?;
    }
    if !tool.external_references.is_empty() {
        write_external_references(w, &tool.external_references)?;
    }
    w.write_event(Event::End(BytesEnd::new("tool")))?;
    Ok(())
}

fn write_component(w: &mut XmlWriter, component: &Component, version: SpecVersion) -> Result<()> {
    write_component_impl(w, component, version, true)
}

fn write_component_impl(
    w: &mut XmlWriter,
    component: &Component,
    version: SpecVersion,
    emit_ref: bool,
) -> Result<()> {
    let since = component.component_type.supported_since();
    if since > version {
        return Err(Error::SerializationOfUnsupportedComponentType {
            component: component.display_name(),
            component_type: component.component_type.to_string(),
            version,
        });
    }

    let mut start = BytesStart::new("component");
    start.push_attribute(("type", component.component_type.as_str()));
    // bom-ref became an attribute in 1.1.
    if emit_ref && version >= SpecVersion::V1_1 {
        start.push_attribute(("bom-ref", component.bom_ref.value()));
    }
    w.write_event(Event::Start(start))?;

    opt_text_elem(w, "group", component.group.as_deref())?;
    text_elem(w, "name", &component.name)?;
    opt_text_elem(w, "version", component.version.as_deref())?;
    opt_text_elem(w, "description", component.description.as_deref())?;
    if version.supports(SchemaFeature::ComponentAuthor) {
        opt_text_elem(w, "author", component.author.as_deref())?;
    }
    opt_text_elem(w, "copyright", component.copyright.as_deref())?;
    if let Some(supplier) = &component.supplier {
        write_org(w, "supplier", supplier)?;
    }
    if !component.hashes.is_empty() {
        write_hashes(w, &component.hashes)?;
    }
    if !component.licenses.is_empty() {
        write_licenses(w, &component.licenses)?;
    }
    opt_text_elem(w, "purl", component.purl.as_deref())?;
    opt_text_elem(w, "cpe", component.cpe.as_deref())?;
    if !component.external_references.is_empty()
        && version.supports(SchemaFeature::ExternalReferences)
    {
        write_external_references(w, &component.external_references)?;
    }
    if !component.properties.is_empty() && version.supports(SchemaFeature::ComponentProperties) {
        w.write_event(Event::Start(BytesStart::new("properties")))?;
        for property in sorted_clone(&component.properties) {
            let mut start = BytesStart::new("property");
            start.push_attribute(("name", property.name.as_str()));
            w.write_event(Event::Start(start))?;
            w.write_event(Event::Text(BytesText::new(&property.value)))?;
            w.write_event(Event::End(BytesEnd::new("property")))?;
        }
        w.write_event(Event::End(BytesEnd::new("properties")))?;
    }
    if !component.components.is_empty() {
        w.write_event(Event::Start(BytesStart::new("components")))?;
        for child in sorted_clone(&component.components) {
            write_component(w, &child, version)?;
        }
        w.write_event(Event::End(BytesEnd::new("components")))?;
    }

    w.write_event(Event::End(BytesEnd::new("component")))?;
    Ok(())
}

fn write_service(w: &mut XmlWriter, service: &Service) -> Result<()> {
    write_service_impl(w, service, true)
}

fn write_service_impl(w: &mut XmlWriter, service: &Service, emit_ref: bool) -> Result<()> {
    let mut start = BytesStart::new("service");
    if emit_ref {
        start.push_attribute(("bom-ref", service.bom_ref.value()));
    }
    w.write_event(Event::Start(start))?;

    if let Some(provider) = &service.provider {
        write_org(w, "provider", provider)?;
    }
    opt_text_elem(w, "group", service.group.as_deref())?;
    text_elem(w, "name", &service.name)?;
    opt_text_elem(w, "version", service.version.as_deref())?;
    opt_text_elem(w, "description", service.description.as_deref())?;
    if !service.licenses.is_empty() {
        write_licenses(w, &service.licenses)?;
    }
    if !service.external_references.is_empty() {
        write_external_references(w, &service.external_references)?;
    }
    if !service.services.is_empty() {
        w.write_event(Event::Start(BytesStart::new("services")))?;
        for child in sorted_clone(&service.services) {
            write_service(w, &child)?;
        }
        w.write_event(Event::End(BytesEnd::new("services")))?;
    }

    w.write_event(Event::End(BytesEnd::new("service")))?;
    Ok(())
}

fn write_licenses(w: &mut XmlWriter, licenses: &Licenses) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new("licenses")))?;
    for choice in licenses.effective_choices() {
        match choice {
            LicenseChoice::Expression(expr) => text_elem(w, "expression", expr.as_str())?,
            LicenseChoice::License(license) => {
                w.write_event(Event::Start(BytesStart::new("license")))?;
                opt_text_elem(w, "id", license.id())?;
                opt_text_elem(w, "name", license.name())?;
                opt_text_elem(w, "text", license.text.as_deref())?;
                opt_text_elem(w, "url", license.url.as_deref())?;
                w.write_event(Event::End(BytesEnd::new("license")))?;
            }
        }
    }
    w.write_event(Event::End(BytesEnd::new("licenses")))?;
    Ok(())
}

fn write_hashes(w: &mut XmlWriter, hashes: &[Hash]) -> Result<()> {
    let mut hashes: Vec<&Hash> = hashes.iter().collect();
    hashes.sort();
    w.write_event(Event::Start(BytesStart::new("hashes")))?;
    for hash in hashes {
        let mut start = BytesStart::new("hash");
        start.push_attribute(("alg", hash.alg.as_str()));
        w.write_event(Event::Start(start))?;
        w.write_event(Event::Text(BytesText::new(&hash.content)))?;
        w.write_event(Event::End(BytesEnd::new("hash")))?;
    }
    w.write_event(Event::End(BytesEnd::new("hashes")))?;
    Ok(())
}

fn write_external_references(w: &mut XmlWriter, refs: &[ExternalReference]) -> Result<()> {
    let mut refs: Vec<&ExternalReference> = refs.iter().collect();
    refs.sort_by(|a, b| a.canonical_cmp(b));
    w.write_event(Event::Start(BytesStart::new("externalReferences")))?;
    for reference in refs {
        let mut start = BytesStart::new("reference");
        start.push_attribute(("type", reference.ref_type.as_str()));
        w.write_event(Event::Start(start))?;
        text_elem(w, "url", &reference.url)?;
        opt_text_elem(w, "comment", reference.comment.as_deref())?;
        if !reference.hashes.is_empty() {
            write_hashes(w, &reference.hashes)?;
        }
        w.write_event(Event::End(BytesEnd::new("reference")))?;
    }
    w.write_event(Event::End(BytesEnd::new("externalReferences")))?;
    Ok(())
}

fn write_org(w: &mut XmlWriter, name: &str, org: &OrganizationalEntity) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    opt_text_elem(w, "name", org.name.as_deref())?;
    let mut urls = org.urls.clone();
    urls.sort();
    for url in &urls {
        text_elem(w, "url", url)?;
    }
    for contact in sorted_clone(&org.contacts) {
        write_contact(w, "contact", &contact)?;
    }
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_contact(w: &mut XmlWriter, name: &str, contact: &OrganizationalContact) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    opt_text_elem(w, "name", contact.name.as_deref())?;
    opt_text_elem(w, "email", contact.email.as_deref())?;
    opt_text_elem(w, "phone", contact.phone.as_deref())?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_vulnerability(w: &mut XmlWriter, vuln: &Vulnerability) -> Result<()> {
    let mut start = BytesStart::new("vulnerability");
    start.push_attribute(("bom-ref", vuln.bom_ref.value()));
    w.write_event(Event::Start(start))?;

    text_elem(w, "id", &vuln.id)?;
    if let Some(source) = &vuln.source {
        w.write_event(Event::Start(BytesStart::new("source")))?;
        opt_text_elem(w, "name", source.name.as_deref())?;
        opt_text_elem(w, "url", source.url.as_deref())?;
        w.write_event(Event::End(BytesEnd::new("source")))?;
    }
    if !vuln.ratings.is_empty() {
        w.write_event(Event::Start(BytesStart::new("ratings")))?;
        for rating in sorted_clone(&vuln.ratings) {
            w.write_event(Event::Start(BytesStart::new("rating")))?;
            if let Some(score) = rating.score {
                text_elem(w, "score", &score.to_string())?;
            }
            if let Some(severity) = rating.severity {
                text_elem(w, "severity", severity.as_str())?;
            }
            opt_text_elem(w, "method", rating.method.as_deref())?;
            opt_text_elem(w, "vector", rating.vector.as_deref())?;
            w.write_event(Event::End(BytesEnd::new("rating")))?;
        }
        w.write_event(Event::End(BytesEnd::new("ratings")))?;
    }
    if !vuln.cwes.is_empty() {
        let mut cwes = vuln.cwes.clone();
        cwes.sort_unstable();
        cwes.dedup();
        w.write_event(Event::Start(BytesStart::new("cwes")))?;
        for cwe in cwes {
            text_elem(w, "cwe", &cwe.to_string())?;
        }
        w.write_event(Event::End(BytesEnd::new("cwes")))?;
    }
    opt_text_elem(w, "description", vuln.description.as_deref())?;
    opt_text_elem(w, "recommendation", vuln.recommendation.as_deref())?;
    if !vuln.affects.is_empty() {
        let mut affects: Vec<&str> = vuln.affects.iter().map(|r| r.value()).collect();
        affects.sort_unstable();
        w.write_event(Event::Start(BytesStart::new("affects")))?;
        for target_ref in affects {
            w.write_event(Event::Start(BytesStart::new("target")))?;
            text_elem(w, "ref", target_ref)?;
            w.write_event(Event::End(BytesEnd::new("target")))?;
        }
        w.write_event(Event::End(BytesEnd::new("affects")))?;
    }

    w.write_event(Event::End(BytesEnd::new("vulnerability")))?;
    Ok(())
}

fn write_standard(w: &mut XmlWriter, standard: &Standard) -> Result<()> {
    let mut start = BytesStart::new("standard");
    start.push_attribute(("bom-ref", standard.bom_ref.value()));
    w.write_event(Event::Start(start))?;

    text_elem(w, "name", &standard.name)?;
    opt_text_elem(w, "version", standard.version.as_deref())?;
    opt_text_elem(w, "description", standard.description.as_deref())?;
    opt_text_elem(w, "owner", standard.owner.as_deref())?;
    if !standard.requirements.is_empty() {
        w.write_event(Event::Start(BytesStart::new("requirements")))?;
        for req in sorted_clone(&standard.requirements) {
            let mut start = BytesStart::new("requirement");
            start.push_attribute(("bom-ref", req.bom_ref.value()));
            w.write_event(Event::Start(start))?;
            text_elem(w, "identifier", &req.identifier)?;
            opt_text_elem(w, "title", req.title.as_deref())?;
            opt_text_elem(w, "text", req.text.as_deref())?;
            w.write_event(Event::End(BytesEnd::new("requirement")))?;
        }
        w.write_event(Event::End(BytesEnd::new("requirements")))?;
    }
    if !standard.levels.is_empty() {
        w.write_event(Event::Start(BytesStart::new("levels")))?;
        for level in sorted_clone(&standard.levels) {
            let mut start = BytesStart::new("level");
            start.push_attribute(("bom-ref", level.bom_ref.value()));
            w.write_event(Event::Start(start))?;
            text_elem(w, "identifier", &level.identifier)?;
            opt_text_elem(w, "title", level.title.as_deref())?;
            opt_text_elem(w, "description", level.description.as_deref())?;
            if !level.requirements.is_empty() {
                let mut refs: Vec<&str> =
                    level.requirements.iter().map(|r| r.value()).collect();
                refs.sort_unstable();
                w.write_event(Event::Start(BytesStart::new("requirements")))?;
                for req_ref in refs {
                    text_elem(w, "requirement", req_ref)?;
                }
                w.write_event(Event::End(BytesEnd::new("requirements")))?;
            }
            w.write_event(Event::End(BytesEnd::new("level")))?;
        }
        w.write_event(Event::End(BytesEnd::new("levels")))?;
    }

    w.write_event(Event::End(BytesEnd::new("standard")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BomRef, ComponentType, Property};

    fn make_component(name: &str, bom_ref: &str) -> Component {
        Component::new(ComponentType::Library, name).with_bom_ref(bom_ref)
    }

    #[test]
    fn root_element_carries_namespace_and_serial() {
        let mut bom = Bom::default();
        bom.serial_number = Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string());
        bom.version = 2;
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        assert!(out.contains("http://cyclonedx.org/schema/bom/1.4"));
        assert!(out.contains("serialNumber=\"urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79\""));
        assert!(out.contains("version=\"2\""));
    }

    #[test]
    fn old_revisions_have_no_metadata_or_dependencies() {
        let mut bom = Bom::default();
        bom.metadata.component = Some(make_component("app", "root"));
        bom.add_component(make_component("lib", "lib"));
        bom.register_dependency(BomRef::new("root"), [BomRef::new("lib")]);

        let out = render(&bom, SpecVersion::V1_1).expect("render");
        assert!(!out.contains("<metadata>"));
        assert!(!out.contains("<dependencies>"));

        let out = render(&bom, SpecVersion::V1_2).expect("render");
        assert!(out.contains("<metadata>"));
        assert!(out.contains("<dependency ref=\"root\">"));
    }

    #[test]
    fn bom_ref_attribute_is_absent_in_1_0() {
        let mut bom = Bom::default();
        bom.add_component(make_component("lib", "lib"));
        let out = render(&bom, SpecVersion::V1_0).expect("render");
        assert!(!out.contains("bom-ref"));
        let out = render(&bom, SpecVersion::V1_1).expect("render");
        assert!(out.contains("bom-ref=\"lib\""));
    }

    #[test]
    fn empty_dependency_targets_render_as_empty_element() {
        let mut bom = Bom::default();
        bom.add_component(make_component("lib", "lib"));
        bom.register_dependency(BomRef::new("lib"), []);
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        assert!(out.contains("<dependency ref=\"lib\"/>"));
    }

    #[test]
    fn properties_render_with_name_attribute() {
        let mut component = make_component("lib", "lib");
        component.properties.push(Property::new("origin", "registry"));
        let mut bom = Bom::default();
        bom.add_component(component);
        let out = render(&bom, SpecVersion::V1_3).expect("render");
        assert!(out.contains("<property name=\"origin\">registry</property>"));
    }

    #[test]
    fn projected_tool_components_carry_no_ref() {
        use crate::model::Tool;

        let mut bom = Bom::default();
        bom.metadata
            .tools
            .add_tool(Tool::new("acme", "scanner", "1.0"))
            .expect("legacy shape");
        // The synthetic tool ref would collide with this declared component.
        bom.add_component(make_component("scanner", "scanner@1.0"));

        let out = render(&bom, SpecVersion::V1_5).expect("render");
        assert_eq!(out.matches("bom-ref=\"scanner@1.0\"").count(), 1);
        assert!(out.contains("<tools>"));
        assert!(out.contains("<name>scanner</name>"));
    }

    #[test]
    fn text_content_is_escaped() {
        let mut bom = Bom::default();
        bom.add_component(make_component("a<b&c", "weird"));
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        assert!(out.contains("a&lt;b&amp;c"));
    }
}
