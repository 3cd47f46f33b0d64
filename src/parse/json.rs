//! JSON wire structs and their conversion into the model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    Bom, BomRef, Component, ComponentType, DisjunctiveLicense, ExternalReference,
    ExternalReferenceType, Hash, HashAlgorithm, Level, LicenseChoice, LicenseExpression,
    Licenses, Metadata, OrganizationalContact, OrganizationalEntity, Property, Requirement,
    Service, Severity, Standard, Tool, Tools, Vulnerability, VulnerabilityRating,
    VulnerabilitySource,
};
use crate::spec_version::SpecVersion;

pub(crate) fn parse(content: &str) -> Result<(Bom, Option<SpecVersion>)> {
    let wire: WireBom = serde_json::from_str(content)?;
    let declared = wire
        .spec_version
        .as_deref()
        .map(str::parse::<SpecVersion>)
        .transpose()?;

    let mut bom = Bom {
        serial_number: wire.serial_number,
        version: wire.version.unwrap_or(1),
        ..Bom::default()
    };
    if let Some(metadata) = wire.metadata {
        bom.metadata = convert_metadata(metadata)?;
    }
    for component in wire.components {
        bom.components.push(convert_component(component)?);
    }
    for service in wire.services {
        bom.services.push(convert_service(service)?);
    }
    for dep in wire.dependencies {
        bom.register_dependency(
            BomRef::new(dep.dependency_ref),
            dep.depends_on.into_iter().map(BomRef::new),
        );
    }
    for vuln in wire.vulnerabilities {
        bom.vulnerabilities.push(convert_vulnerability(vuln));
    }
    if let Some(definitions) = wire.definitions {
        for standard in definitions.standards {
            bom.definitions.push(convert_standard(standard));
        }
    }

    Ok((bom, declared))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBom {
    #[allow(dead_code)]
    bom_format: Option<String>,
    spec_version: Option<String>,
    serial_number: Option<String>,
    version: Option<u32>,
    metadata: Option<WireMetadata>,
    #[serde(default)]
    components: Vec<WireComponent>,
    #[serde(default)]
    services: Vec<WireService>,
    #[serde(default)]
    dependencies: Vec<WireDependency>,
    #[serde(default)]
    vulnerabilities: Vec<WireVulnerability>,
    definitions: Option<WireDefinitions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
    timestamp: Option<DateTime<Utc>>,
    tools: Option<WireTools>,
    #[serde(default)]
    authors: Vec<WireContact>,
    component: Option<WireComponent>,
    manufacture: Option<WireOrg>,
    supplier: Option<WireOrg>,
    #[serde(default)]
    licenses: Vec<WireLicenseChoice>,
}

/// The tool collection arrives either as a flat array (1.2–1.4) or as an
/// object of typed collections (1.5+).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTools {
    Legacy(Vec<WireTool>),
    Typed {
        #[serde(default)]
        components: Vec<WireComponent>,
        #[serde(default)]
        services: Vec<WireService>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    vendor: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    hashes: Vec<WireHash>,
    #[serde(default)]
    external_references: Vec<WireExternalReference>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireComponent {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    #[serde(rename = "type")]
    component_type: String,
    group: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    author: Option<String>,
    copyright: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    supplier: Option<WireOrg>,
    #[serde(default)]
    licenses: Vec<WireLicenseChoice>,
    #[serde(default)]
    hashes: Vec<WireHash>,
    #[serde(default)]
    external_references: Vec<WireExternalReference>,
    #[serde(default)]
    properties: Vec<WireProperty>,
    #[serde(default)]
    components: Vec<WireComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireService {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    provider: Option<WireOrg>,
    group: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    #[serde(default)]
    licenses: Vec<WireLicenseChoice>,
    #[serde(default)]
    external_references: Vec<WireExternalReference>,
    #[serde(default)]
    services: Vec<WireService>,
}

#[derive(Debug, Deserialize)]
struct WireDependency {
    #[serde(rename = "ref")]
    dependency_ref: String,
    #[serde(rename = "dependsOn", default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireLicenseChoice {
    license: Option<WireLicense>,
    expression: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLicense {
    id: Option<String>,
    name: Option<String>,
    text: Option<WireLicenseText>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLicenseText {
    Attachment { content: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct WireHash {
    alg: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireExternalReference {
    #[serde(rename = "type")]
    ref_type: String,
    url: String,
    comment: Option<String>,
    #[serde(default)]
    hashes: Vec<WireHash>,
}

#[derive(Debug, Deserialize)]
struct WireProperty {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireOrg {
    name: Option<String>,
    #[serde(default)]
    url: Vec<String>,
    #[serde(default)]
    contact: Vec<WireContact>,
}

#[derive(Debug, Deserialize)]
struct WireContact {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVulnerability {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    id: String,
    source: Option<WireVulnerabilitySource>,
    description: Option<String>,
    recommendation: Option<String>,
    #[serde(default)]
    ratings: Vec<WireRating>,
    #[serde(default)]
    cwes: Vec<u32>,
    #[serde(default)]
    affects: Vec<WireAffect>,
}

#[derive(Debug, Deserialize)]
struct WireVulnerabilitySource {
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRating {
    score: Option<f32>,
    severity: Option<String>,
    method: Option<String>,
    vector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAffect {
    #[serde(rename = "ref")]
    affect_ref: String,
}

#[derive(Debug, Deserialize)]
struct WireDefinitions {
    #[serde(default)]
    standards: Vec<WireStandard>,
}

#[derive(Debug, Deserialize)]
struct WireStandard {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    owner: Option<String>,
    #[serde(default)]
    requirements: Vec<WireRequirement>,
    #[serde(default)]
    levels: Vec<WireLevel>,
}

#[derive(Debug, Deserialize)]
struct WireRequirement {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    identifier: String,
    title: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLevel {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    identifier: String,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    requirements: Vec<String>,
}

fn bom_ref_or_generated(value: Option<String>) -> BomRef {
    value.map_or_else(BomRef::generate, BomRef::new)
}

fn convert_metadata(wire: WireMetadata) -> Result<Metadata> {
    let mut metadata = Metadata {
        timestamp: wire.timestamp,
        ..Metadata::default()
    };
    if let Some(tools) = wire.tools {
        metadata.tools = convert_tools(tools)?;
    }
    metadata.authors = wire.authors.into_iter().map(convert_contact).collect();
    if let Some(component) = wire.component {
        metadata.component = Some(convert_component(component)?);
    }
    metadata.manufacture = wire.manufacture.map(convert_org);
    metadata.supplier = wire.supplier.map(convert_org);
    metadata.licenses = convert_licenses(wire.licenses)?;
    Ok(metadata)
}

fn convert_tools(wire: WireTools) -> Result<Tools> {
    match wire {
        WireTools::Legacy(tools) => {
            let tools = tools
                .into_iter()
                .map(|t| {
                    Ok(Tool {
                        vendor: t.vendor,
                        name: t.name,
                        version: t.version,
                        hashes: convert_hashes(t.hashes)?,
                        external_references: convert_external_references(t.external_references),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Tools::from_parts(tools, Vec::new(), Vec::new()))
        }
        WireTools::Typed {
            components,
            services,
        } => {
            let components = components
                .into_iter()
                .map(convert_component)
                .collect::<Result<Vec<_>>>()?;
            let services = services
                .into_iter()
                .map(convert_service)
                .collect::<Result<Vec<_>>>()?;
            Ok(Tools::from_parts(Vec::new(), components, services))
        }
    }
}

fn convert_component(wire: WireComponent) -> Result<Component> {
    let component_type = ComponentType::from_wire(&wire.component_type).ok_or_else(|| {
        Error::invalid_structure(format!("unknown component type: {}", wire.component_type))
    })?;
    let mut component = Component::new(component_type, wire.name);
    component.bom_ref = bom_ref_or_generated(wire.bom_ref);
    if let Some(version) = wire.version {
        component = component.with_version(version);
    }
    component.group = wire.group;
    component.description = wire.description;
    component.author = wire.author;
    component.copyright = wire.copyright;
    component.purl = wire.purl;
    component.cpe = wire.cpe;
    component.supplier = wire.supplier.map(convert_org);
    component.licenses = convert_licenses(wire.licenses)?;
    component.hashes = convert_hashes(wire.hashes)?;
    component.external_references = convert_external_references(wire.external_references);
    component.properties = wire
        .properties
        .into_iter()
        .map(|p| Property::new(p.name, p.value))
        .collect();
    component.components = wire
        .components
        .into_iter()
        .map(convert_component)
        .collect::<Result<Vec<_>>>()?;
    Ok(component)
}

fn convert_service(wire: WireService) -> Result<Service> {
    let mut service = Service::new(wire.name);
    service.bom_ref = bom_ref_or_generated(wire.bom_ref);
    service.provider = wire.provider.map(convert_org);
    service.group = wire.group;
    service.version = wire.version;
    service.description = wire.description;
    service.licenses = convert_licenses(wire.licenses)?;
    service.external_references = convert_external_references(wire.external_references);
    service.services = wire
        .services
        .into_iter()
        .map(convert_service)
        .collect::<Result<Vec<_>>>()?;
    Ok(service)
}

fn convert_licenses(wire: Vec<WireLicenseChoice>) -> Result<Licenses> {
    let mut licenses = Licenses::new();
    for choice in wire {
        match (choice.license, choice.expression) {
            (Some(license), None) => {
                let mut converted = DisjunctiveLicense::new(license.id, license.name)?;
                converted.text = license.text.map(|t| match t {
                    WireLicenseText::Attachment { content } => content,
                    WireLicenseText::Plain(content) => content,
                });
                converted.url = license.url;
                licenses.push(LicenseChoice::License(converted));
            }
            (None, Some(expression)) => match LicenseExpression::try_new(expression) {
                Ok(expr) => licenses.push(LicenseChoice::Expression(expr)),
                Err(Error::InvalidLicenseExpression(raw)) => {
                    tracing::warn!(expression = %raw, "unparseable license expression, demoting to name");
                    licenses.push(LicenseChoice::License(DisjunctiveLicense::named(raw)));
                }
                Err(other) => return Err(other),
            },
            (Some(_), Some(_)) => {
                return Err(Error::invalid_structure(
                    "license choice carries both a license object and an expression",
                ))
            }
            (None, None) => {
                return Err(Error::invalid_structure(
                    "license choice carries neither a license object nor an expression",
                ))
            }
        }
    }
    Ok(licenses)
}

fn convert_hashes(wire: Vec<WireHash>) -> Result<Vec<Hash>> {
    wire.into_iter()
        .map(|h| {
            let alg: HashAlgorithm = h.alg.parse()?;
            Ok(Hash::new(alg, h.content))
        })
        .collect()
}

fn convert_external_references(wire: Vec<WireExternalReference>) -> Vec<ExternalReference> {
    wire.into_iter()
        .map(|r| {
            let mut reference =
                ExternalReference::new(ExternalReferenceType::from_wire(&r.ref_type), r.url);
            reference.comment = r.comment;
            reference.hashes = convert_hashes(r.hashes).unwrap_or_default();
            reference
        })
        .collect()
}

fn convert_org(wire: WireOrg) -> OrganizationalEntity {
    OrganizationalEntity {
        name: wire.name,
        urls: wire.url,
        contacts: wire.contact.into_iter().map(convert_contact).collect(),
    }
}

fn convert_contact(wire: WireContact) -> OrganizationalContact {
    OrganizationalContact {
        name: wire.name,
        email: wire.email,
        phone: wire.phone,
    }
}

fn convert_vulnerability(wire: WireVulnerability) -> Vulnerability {
    let mut vuln = Vulnerability::new(wire.id);
    vuln.bom_ref = bom_ref_or_generated(wire.bom_ref);
    vuln.source = wire.source.map(|s| VulnerabilitySource {
        name: s.name,
        url: s.url,
    });
    vuln.description = wire.description;
    vuln.recommendation = wire.recommendation;
    vuln.ratings = wire
        .ratings
        .into_iter()
        .map(|r| VulnerabilityRating {
            score: r.score,
            severity: r.severity.as_deref().map(Severity::from_wire),
            method: r.method,
            vector: r.vector,
        })
        .collect();
    vuln.cwes = wire.cwes;
    vuln.affects = wire
        .affects
        .into_iter()
        .map(|a| BomRef::new(a.affect_ref))
        .collect();
    vuln
}

fn convert_standard(wire: WireStandard) -> Standard {
    let mut standard = Standard::new(wire.name);
    standard.bom_ref = bom_ref_or_generated(wire.bom_ref);
    standard.version = wire.version;
    standard.description = wire.description;
    standard.owner = wire.owner;
    standard.requirements = wire
        .requirements
        .into_iter()
        .map(|r| {
            let mut req = Requirement::new(r.identifier);
            req.bom_ref = bom_ref_or_generated(r.bom_ref);
            req.title = r.title;
            req.text = r.text;
            req
        })
        .collect();
    standard.levels = wire
        .levels
        .into_iter()
        .map(|l| {
            let mut level = Level::new(l.identifier);
            level.bom_ref = bom_ref_or_generated(l.bom_ref);
            level.title = l.title;
            level.description = l.description;
            level.requirements = l.requirements.into_iter().map(BomRef::new).collect();
            level
        })
        .collect();
    standard
}
