//! JSON projection (schema 1.2+).
//!
//! Builds a `serde_json::Value` tree and pretty-prints it. Object keys render
//! in sorted order and entity collections are sorted by their canonical keys
//! before projection, so output is byte-identical across runs.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::{
    Bom, Component, ExternalReference, Hash, LicenseChoice, Licenses, Metadata,
    OrganizationalContact, OrganizationalEntity, Service, Standard, Tool, Vulnerability,
};
use crate::order::{sorted_clone, CanonicalOrder};
use crate::spec_version::{SchemaFeature, SpecVersion};

pub(crate) fn render(bom: &Bom, version: SpecVersion) -> Result<String> {
    let mut doc = Map::new();
    doc.insert("bomFormat".into(), json!("CycloneDX"));
    doc.insert("specVersion".into(), json!(version.as_str()));
    if let Some(serial) = &bom.serial_number {
        doc.insert("serialNumber".into(), json!(serial));
    }
    doc.insert("version".into(), json!(bom.version));

    let metadata = metadata_value(&bom.metadata, version)?;
    if metadata.as_object().map_or(false, |m| !m.is_empty()) {
        doc.insert("metadata".into(), metadata);
    }

    let mut components = Vec::new();
    for component in sorted_clone(&bom.components) {
        components.push(component_value(&component, version)?);
    }
    doc.insert("components".into(), Value::Array(components));

    if !bom.services.is_empty() {
        let services: Vec<Value> = sorted_clone(&bom.services)
            .iter()
            .map(service_value)
            .collect();
        doc.insert("services".into(), Value::Array(services));
    }

    if !bom.dependencies.is_empty() {
        let deps: Vec<Value> = bom
            .dependencies
            .iter()
            .map(|(dependent, targets)| {
                let depends_on: Vec<&str> = targets.iter().map(|t| t.value()).collect();
                json!({ "ref": dependent.value(), "dependsOn": depends_on })
            })
            .collect();
        doc.insert("dependencies".into(), Value::Array(deps));
    }

    if !bom.vulnerabilities.is_empty() {
        if version.supports(SchemaFeature::Vulnerabilities) {
            let vulns: Vec<Value> = sorted_clone(&bom.vulnerabilities)
                .iter()
                .map(vulnerability_value)
                .collect();
            doc.insert("vulnerabilities".into(), Value::Array(vulns));
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
            let standards: Vec<Value> = sorted_clone(&bom.definitions)
                .iter()
                .map(standard_value)
                .collect();
            doc.insert("definitions".into(), json!({ "standards": standards }));
        } else {
            tracing::warn!(
                count = bom.definitions.len(),
                %version,
                "definitions have no encoding at this schema version, omitting"
            );
        }
    }

    Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
}

fn metadata_value(metadata: &Metadata, version: SpecVersion) -> Result<Value> {
    let mut out = Map::new();
    if let Some(timestamp) = metadata.timestamp_rfc3339() {
        out.insert("timestamp".into(), json!(timestamp));
    }
    if !metadata.tools.is_empty() {
        out.insert("tools".into(), tools_value(metadata, version)?);
    }
    if !metadata.authors.is_empty() {
        let authors: Vec<Value> = sorted_clone(&metadata.authors)
            .iter()
            .map(contact_value)
            .collect();
        out.insert("authors".into(), Value::Array(authors));
    }
    if let Some(component) = &metadata.component {
        out.insert("component".into(), component_value(component, version)?);
    }
    if let Some(manufacture) = &metadata.manufacture {
        out.insert("manufacture".into(), org_value(manufacture));
    }
    if let Some(supplier) = &metadata.supplier {
        out.insert("supplier".into(), org_value(supplier));
    }
    if !metadata.licenses.is_empty() {
        if version.supports(SchemaFeature::MetadataLicenses) {
            out.insert("licenses".into(), licenses_value(&metadata.licenses));
        } else {
            tracing::warn!(
                %version,
                "metadata licenses have no encoding at this schema version, omitting"
            );
        }
    }
    Ok(Value::Object(out))
}

fn tools_value(metadata: &Metadata, version: SpecVersion) -> Result<Value> {
    let tools = &metadata.tools;
    if version.supports(SchemaFeature::ToolComponents) {
        let (components, services) = tools.as_typed();
        let mut out = Map::new();
        if !components.is_empty() {
            let mut values = Vec::new();
            for c in &components {
                let mut value = component_value(c, version)?;
                // Tool entities are not dependency targets; their refs stay
                // internal to the model.
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("bom-ref");
                }
                values.push(value);
            }
            out.insert("components".into(), Value::Array(values));
        }
        if !services.is_empty() {
            let values: Vec<Value> = services
                .iter()
                .map(|s| {
                    let mut value = service_value(s);
                    if let Some(obj) = value.as_object_mut() {
                        obj.remove("bom-ref");
                    }
                    value
                })
                .collect();
            out.insert("services".into(), Value::Array(values));
        }
        Ok(Value::Object(out))
    } else {
        let legacy: Vec<Value> = tools.as_legacy().iter().map(tool_value).collect();
        Ok(Value::Array(legacy))
    }
}

fn tool_value(tool: &Tool) -> Value {
    let mut out = Map::new();
    if let Some(vendor) = &tool.vendor {
        out.insert("vendor".into(), json!(vendor));
    }
    if let Some(name) = &tool.name {
        out.insert("name".into(), json!(name));
    }
    if let Some(version) = &tool.version {
        out.insert("version".into(), json!(version));
    }
    if !tool.hashes.is_empty() {
        out.insert("hashes".into(), hashes_value(&tool.hashes));
    }
    if !tool.external_references.is_empty() {
        out.insert(
            "externalReferences".into(),
            external_references_value(&tool.external_references),
        );
    }
    Value::Object(out)
}

fn component_value(component: &Component, version: SpecVersion) -> Result<Value> {
    let since = component.component_type.supported_since();
    if since > version {
        return Err(Error::SerializationOfUnsupportedComponentType {
            component: component.display_name(),
            component_type: component.component_type.to_string(),
            version,
        });
    }

    let mut out = Map::new();
    out.insert("type".into(), json!(component.component_type.as_str()));
    out.insert("bom-ref".into(), json!(component.bom_ref.value()));
    if let Some(group) = &component.group {
        out.insert("group".into(), json!(group));
    }
    out.insert("name".into(), json!(component.name));
    if let Some(version_str) = &component.version {
        out.insert("version".into(), json!(version_str));
    }
    if let Some(description) = &component.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(author) = &component.author {
        if version.supports(SchemaFeature::ComponentAuthor) {
            out.insert("author".into(), json!(author));
        }
    }
    if let Some(copyright) = &component.copyright {
        out.insert("copyright".into(), json!(copyright));
    }
    if let Some(purl) = &component.purl {
        out.insert("purl".into(), json!(purl));
    }
    if let Some(cpe) = &component.cpe {
        out.insert("cpe".into(), json!(cpe));
    }
    if let Some(supplier) = &component.supplier {
        out.insert("supplier".into(), org_value(supplier));
    }
    if !component.licenses.is_empty() {
        out.insert("licenses".into(), licenses_value(&component.licenses));
    }
    if !component.hashes.is_empty() {
        out.insert("hashes".into(), hashes_value(&component.hashes));
    }
    if !component.external_references.is_empty()
        && version.supports(SchemaFeature::ExternalReferences)
    {
        out.insert(
            "externalReferences".into(),
            external_references_value(&component.external_references),
        );
    }
    if !component.properties.is_empty() && version.supports(SchemaFeature::ComponentProperties) {
        let props: Vec<Value> = sorted_clone(&component.properties)
            .iter()
            .map(|p| json!({ "name": p.name, "value": p.value }))
            .collect();
        out.insert("properties".into(), Value::Array(props));
    }
    if !component.components.is_empty() {
        let mut nested = Vec::new();
        for child in sorted_clone(&component.components) {
            nested.push(component_value(&child, version)?);
        }
        out.insert("components".into(), Value::Array(nested));
    }
    Ok(Value::Object(out))
}

fn service_value(service: &Service) -> Value {
    let mut out = Map::new();
    out.insert("bom-ref".into(), json!(service.bom_ref.value()));
    if let Some(provider) = &service.provider {
        out.insert("provider".into(), org_value(provider));
    }
    if let Some(group) = &service.group {
        out.insert("group".into(), json!(group));
    }
    out.insert("name".into(), json!(service.name));
    if let Some(version) = &service.version {
        out.insert("version".into(), json!(version));
    }
    if let Some(description) = &service.description {
        out.insert("description".into(), json!(description));
    }
    if !service.licenses.is_empty() {
        out.insert("licenses".into(), licenses_value(&service.licenses));
    }
    if !service.external_references.is_empty() {
        out.insert(
            "externalReferences".into(),
            external_references_value(&service.external_references),
        );
    }
    if !service.services.is_empty() {
        let nested: Vec<Value> = sorted_clone(&service.services)
            .iter()
            .map(service_value)
            .collect();
        out.insert("services".into(), Value::Array(nested));
    }
    Value::Object(out)
}

fn licenses_value(licenses: &Licenses) -> Value {
    let choices: Vec<Value> = licenses
        .effective_choices()
        .into_iter()
        .map(|choice| match choice {
            LicenseChoice::Expression(expr) => json!({ "expression": expr.as_str() }),
            LicenseChoice::License(license) => {
                let mut inner = Map::new();
                if let Some(id) = license.id() {
                    inner.insert("id".into(), json!(id));
                }
                if let Some(name) = license.name() {
                    inner.insert("name".into(), json!(name));
                }
                if let Some(text) = &license.text {
                    inner.insert("text".into(), json!({ "content": text }));
                }
                if let Some(url) = &license.url {
                    inner.insert("url".into(), json!(url));
                }
                json!({ "license": Value::Object(inner) })
            }
        })
        .collect();
    Value::Array(choices)
}

fn hashes_value(hashes: &[Hash]) -> Value {
    let mut hashes: Vec<&Hash> = hashes.iter().collect();
    hashes.sort();
    Value::Array(
        hashes
            .iter()
            .map(|h| json!({ "alg": h.alg.as_str(), "content": h.content }))
            .collect(),
    )
}

fn external_references_value(refs: &[ExternalReference]) -> Value {
    let mut refs: Vec<&ExternalReference> = refs.iter().collect();
    refs.sort_by(|a, b| a.canonical_cmp(b));
    Value::Array(
        refs.iter()
            .map(|r| {
                let mut out = Map::new();
                out.insert("type".into(), json!(r.ref_type.as_str()));
                out.insert("url".into(), json!(r.url));
                if let Some(comment) = &r.comment {
                    out.insert("comment".into(), json!(comment));
                }
                if !r.hashes.is_empty() {
                    out.insert("hashes".into(), hashes_value(&r.hashes));
                }
                Value::Object(out)
            })
            .collect(),
    )
}

fn org_value(org: &OrganizationalEntity) -> Value {
    let mut out = Map::new();
    if let Some(name) = &org.name {
        out.insert("name".into(), json!(name));
    }
    if !org.urls.is_empty() {
        let mut urls = org.urls.clone();
        urls.sort();
        out.insert("url".into(), json!(urls));
    }
    if !org.contacts.is_empty() {
        let contacts: Vec<Value> = sorted_clone(&org.contacts)
            .iter()
            .map(contact_value)
            .collect();
        out.insert("contact".into(), Value::Array(contacts));
    }
    Value::Object(out)
}

fn contact_value(contact: &OrganizationalContact) -> Value {
    let mut out = Map::new();
    if let Some(name) = &contact.name {
        out.insert("name".into(), json!(name));
    }
    if let Some(email) = &contact.email {
        out.insert("email".into(), json!(email));
    }
    if let Some(phone) = &contact.phone {
        out.insert("phone".into(), json!(phone));
    }
    Value::Object(out)
}

fn vulnerability_value(vuln: &Vulnerability) -> Value {
    let mut out = Map::new();
    out.insert("bom-ref".into(), json!(vuln.bom_ref.value()));
    out.insert("id".into(), json!(vuln.id));
    if let Some(source) = &vuln.source {
        let mut src = Map::new();
        if let Some(name) = &source.name {
            src.insert("name".into(), json!(name));
        }
        if let Some(url) = &source.url {
            src.insert("url".into(), json!(url));
        }
        out.insert("source".into(), Value::Object(src));
    }
    if !vuln.ratings.is_empty() {
        let ratings: Vec<Value> = sorted_clone(&vuln.ratings)
            .iter()
            .map(|r| {
                let mut rating = Map::new();
                if let Some(score) = r.score {
                    rating.insert("score".into(), json!(score));
                }
                if let Some(severity) = r.severity {
                    rating.insert("severity".into(), json!(severity.as_str()));
                }
                if let Some(method) = &r.method {
                    rating.insert("method".into(), json!(method));
                }
                if let Some(vector) = &r.vector {
                    rating.insert("vector".into(), json!(vector));
                }
                Value::Object(rating)
            })
            .collect();
        out.insert("ratings".into(), Value::Array(ratings));
    }
    if !vuln.cwes.is_empty() {
        let mut cwes = vuln.cwes.clone();
        cwes.sort_unstable();
        cwes.dedup();
        out.insert("cwes".into(), json!(cwes));
    }
    if let Some(description) = &vuln.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(recommendation) = &vuln.recommendation {
        out.insert("recommendation".into(), json!(recommendation));
    }
    if !vuln.affects.is_empty() {
        let mut affects: Vec<&str> = vuln.affects.iter().map(|r| r.value()).collect();
        affects.sort_unstable();
        let affects: Vec<Value> = affects.iter().map(|r| json!({ "ref": r })).collect();
        out.insert("affects".into(), Value::Array(affects));
    }
    Value::Object(out)
}

fn standard_value(standard: &Standard) -> Value {
    let mut out = Map::new();
    out.insert("bom-ref".into(), json!(standard.bom_ref.value()));
    out.insert("name".into(), json!(standard.name));
    if let Some(version) = &standard.version {
        out.insert("version".into(), json!(version));
    }
    if let Some(description) = &standard.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(owner) = &standard.owner {
        out.insert("owner".into(), json!(owner));
    }
    if !standard.requirements.is_empty() {
        let reqs: Vec<Value> = sorted_clone(&standard.requirements)
            .iter()
            .map(|r| {
                let mut req = Map::new();
                req.insert("bom-ref".into(), json!(r.bom_ref.value()));
                req.insert("identifier".into(), json!(r.identifier));
                if let Some(title) = &r.title {
                    req.insert("title".into(), json!(title));
                }
                if let Some(text) = &r.text {
                    req.insert("text".into(), json!(text));
                }
                Value::Object(req)
            })
            .collect();
        out.insert("requirements".into(), Value::Array(reqs));
    }
    if !standard.levels.is_empty() {
        let levels: Vec<Value> = sorted_clone(&standard.levels)
            .iter()
            .map(|l| {
                let mut level = Map::new();
                level.insert("bom-ref".into(), json!(l.bom_ref.value()));
                level.insert("identifier".into(), json!(l.identifier));
                if let Some(title) = &l.title {
                    level.insert("title".into(), json!(title));
                }
                if let Some(description) = &l.description {
                    level.insert("description".into(), json!(description));
                }
                if !l.requirements.is_empty() {
                    let mut refs: Vec<&str> =
                        l.requirements.iter().map(|r| r.value()).collect();
                    refs.sort_unstable();
                    level.insert("requirements".into(), json!(refs));
                }
                Value::Object(level)
            })
            .collect();
        out.insert("levels".into(), Value::Array(levels));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BomRef, ComponentType, Property, Vulnerability};

    fn make_component(name: &str, bom_ref: &str) -> Component {
        Component::new(ComponentType::Library, name).with_bom_ref(bom_ref)
    }

    #[test]
    fn document_carries_format_and_version() {
        let bom = Bom::default();
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        let value: Value = serde_json::from_str(&out).expect("well-formed");
        assert_eq!(value["bomFormat"], "CycloneDX");
        assert_eq!(value["specVersion"], "1.4");
    }

    #[test]
    fn empty_metadata_block_is_omitted() {
        let bom = Bom::default();
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        let value: Value = serde_json::from_str(&out).expect("well-formed");
        assert!(value.get("metadata").is_none());

        let mut bom = Bom::default();
        bom.metadata.component = Some(make_component("app", "root"));
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        let value: Value = serde_json::from_str(&out).expect("well-formed");
        assert!(value.get("metadata").is_some());
    }

    #[test]
    fn unsupported_component_type_is_an_error() {
        let mut bom = Bom::default();
        bom.add_component(
            Component::new(ComponentType::MachineLearningModel, "model").with_bom_ref("m"),
        );
        let err = render(&bom, SpecVersion::V1_4).unwrap_err();
        assert!(matches!(
            err,
            Error::SerializationOfUnsupportedComponentType { .. }
        ));
        assert!(render(&bom, SpecVersion::V1_5).is_ok());
    }

    #[test]
    fn properties_are_gated_at_1_3() {
        let mut component = make_component("lib", "lib");
        component.properties.push(Property::new("k", "v"));
        let mut bom = Bom::default();
        bom.add_component(component);

        let at_1_2 = render(&bom, SpecVersion::V1_2).expect("render");
        assert!(!at_1_2.contains("properties"));
        let at_1_3 = render(&bom, SpecVersion::V1_3).expect("render");
        assert!(at_1_3.contains("properties"));
    }

    #[test]
    fn vulnerabilities_are_omitted_below_1_4() {
        let mut bom = Bom::default();
        bom.add_component(make_component("lib", "lib"));
        bom.add_vulnerability(Vulnerability::new("CVE-2024-1").affecting("lib"));

        let at_1_3 = render(&bom, SpecVersion::V1_3).expect("render");
        assert!(!at_1_3.contains("CVE-2024-1"));
        let at_1_4 = render(&bom, SpecVersion::V1_4).expect("render");
        assert!(at_1_4.contains("CVE-2024-1"));
    }

    #[test]
    fn components_render_sorted() {
        let mut bom = Bom::default();
        bom.add_component(make_component("zlib", "z"));
        bom.add_component(make_component("abseil", "a"));
        let out = render(&bom, SpecVersion::V1_4).expect("render");
        let value: Value = serde_json::from_str(&out).expect("well-formed");
        assert_eq!(value["components"][0]["name"], "abseil");
        assert_eq!(value["components"][1]["name"], "zlib");
    }

    #[test]
    fn dependencies_render_as_ref_depends_on_pairs() {
        let mut bom = Bom::default();
        bom.add_component(make_component("a", "a"));
        bom.add_component(make_component("b", "b"));
        bom.register_dependency(BomRef::new("a"), [BomRef::new("b")]);
        bom.register_dependency(BomRef::new("b"), []);

        let out = render(&bom, SpecVersion::V1_4).expect("render");
        let value: Value = serde_json::from_str(&out).expect("well-formed");
        assert_eq!(value["dependencies"][0]["ref"], "a");
        assert_eq!(value["dependencies"][0]["dependsOn"][0], "b");
        assert_eq!(
            value["dependencies"][1]["dependsOn"]
                .as_array()
                .map(Vec::len),
            Some(0)
        );
    }
}
