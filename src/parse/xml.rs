//! XML wire structs (quick-xml serde) and their conversion into the model.
//!
//! Attributes map through `@`-prefixed field renames and element text through
//! `$text`; repeated child elements collect into `Vec`s.

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
    let wire: XmlBom = quick_xml::de::from_str(content)?;
    let declared = wire
        .xmlns
        .as_deref()
        .and_then(|ns| ns.rsplit('/').next())
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
    if let Some(components) = wire.components {
        for component in components.component {
            bom.components.push(convert_component(component)?);
        }
    }
    if let Some(services) = wire.services {
        for service in services.service {
            bom.services.push(convert_service(service)?);
        }
    }
    if let Some(dependencies) = wire.dependencies {
        for dep in dependencies.dependency {
            bom.register_dependency(
                BomRef::new(dep.dependency_ref),
                dep.dependency
                    .into_iter()
                    .map(|inner| BomRef::new(inner.dependency_ref)),
            );
        }
    }
    if let Some(vulnerabilities) = wire.vulnerabilities {
        for vuln in vulnerabilities.vulnerability {
            bom.vulnerabilities.push(convert_vulnerability(vuln));
        }
    }
    if let Some(definitions) = wire.definitions {
        if let Some(standards) = definitions.standards {
            for standard in standards.standard {
                bom.definitions.push(convert_standard(standard));
            }
        }
    }

    Ok((bom, declared))
}

#[derive(Debug, Deserialize)]
struct XmlBom {
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    #[serde(rename = "@serialNumber")]
    serial_number: Option<String>,
    #[serde(rename = "@version")]
    version: Option<u32>,
    metadata: Option<XmlMetadata>,
    components: Option<XmlComponents>,
    services: Option<XmlServices>,
    dependencies: Option<XmlDependencies>,
    vulnerabilities: Option<XmlVulnerabilities>,
    definitions: Option<XmlDefinitions>,
}

#[derive(Debug, Deserialize)]
struct XmlMetadata {
    timestamp: Option<String>,
    tools: Option<XmlTools>,
    authors: Option<XmlAuthors>,
    component: Option<XmlComponent>,
    manufacture: Option<XmlOrg>,
    supplier: Option<XmlOrg>,
    licenses: Option<XmlLicenses>,
}

#[derive(Debug, Deserialize)]
struct XmlTools {
    #[serde(rename = "tool", default)]
    tool: Vec<XmlTool>,
    components: Option<XmlComponents>,
    services: Option<XmlServices>,
}

#[derive(Debug, Deserialize)]
struct XmlTool {
    vendor: Option<String>,
    name: Option<String>,
    version: Option<String>,
    hashes: Option<XmlHashes>,
    #[serde(rename = "externalReferences")]
    external_references: Option<XmlExternalReferences>,
}

#[derive(Debug, Deserialize)]
struct XmlAuthors {
    #[serde(rename = "author", default)]
    author: Vec<XmlContact>,
}

#[derive(Debug, Deserialize)]
struct XmlComponents {
    #[serde(rename = "component", default)]
    component: Vec<XmlComponent>,
}

#[derive(Debug, Deserialize)]
struct XmlComponent {
    #[serde(rename = "@type")]
    component_type: String,
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    group: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    author: Option<String>,
    copyright: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    supplier: Option<XmlOrg>,
    hashes: Option<XmlHashes>,
    licenses: Option<XmlLicenses>,
    #[serde(rename = "externalReferences")]
    external_references: Option<XmlExternalReferences>,
    properties: Option<XmlProperties>,
    components: Option<Box<XmlComponents>>,
}

#[derive(Debug, Deserialize)]
struct XmlServices {
    #[serde(rename = "service", default)]
    service: Vec<XmlService>,
}

#[derive(Debug, Deserialize)]
struct XmlService {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    provider: Option<XmlOrg>,
    group: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    licenses: Option<XmlLicenses>,
    #[serde(rename = "externalReferences")]
    external_references: Option<XmlExternalReferences>,
    services: Option<Box<XmlServices>>,
}

#[derive(Debug, Deserialize)]
struct XmlDependencies {
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlDependency>,
}

#[derive(Debug, Deserialize)]
struct XmlDependency {
    #[serde(rename = "@ref")]
    dependency_ref: String,
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlDependency>,
}

#[derive(Debug, Deserialize)]
struct XmlLicenses {
    #[serde(rename = "license", default)]
    license: Vec<XmlLicense>,
    #[serde(rename = "expression", default)]
    expression: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlLicense {
    id: Option<String>,
    name: Option<String>,
    text: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlHashes {
    #[serde(rename = "hash", default)]
    hash: Vec<XmlHash>,
}

#[derive(Debug, Deserialize)]
struct XmlHash {
    #[serde(rename = "@alg")]
    alg: String,
    #[serde(rename = "$text")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct XmlExternalReferences {
    #[serde(rename = "reference", default)]
    reference: Vec<XmlExternalReference>,
}

#[derive(Debug, Deserialize)]
struct XmlExternalReference {
    #[serde(rename = "@type")]
    ref_type: String,
    url: String,
    comment: Option<String>,
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Deserialize)]
struct XmlProperties {
    #[serde(rename = "property", default)]
    property: Vec<XmlProperty>,
}

#[derive(Debug, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct XmlOrg {
    name: Option<String>,
    #[serde(rename = "url", default)]
    url: Vec<String>,
    #[serde(rename = "contact", default)]
    contact: Vec<XmlContact>,
}

#[derive(Debug, Deserialize)]
struct XmlContact {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlVulnerabilities {
    #[serde(rename = "vulnerability", default)]
    vulnerability: Vec<XmlVulnerability>,
}

#[derive(Debug, Deserialize)]
struct XmlVulnerability {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    id: String,
    source: Option<XmlVulnerabilitySource>,
    ratings: Option<XmlRatings>,
    cwes: Option<XmlCwes>,
    description: Option<String>,
    recommendation: Option<String>,
    affects: Option<XmlAffects>,
}

#[derive(Debug, Deserialize)]
struct XmlVulnerabilitySource {
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlRatings {
    #[serde(rename = "rating", default)]
    rating: Vec<XmlRating>,
}

#[derive(Debug, Deserialize)]
struct XmlRating {
    score: Option<f32>,
    severity: Option<String>,
    method: Option<String>,
    vector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlCwes {
    #[serde(rename = "cwe", default)]
    cwe: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct XmlAffects {
    #[serde(rename = "target", default)]
    target: Vec<XmlAffectTarget>,
}

#[derive(Debug, Deserialize)]
struct XmlAffectTarget {
    #[serde(rename = "ref")]
    target_ref: String,
}

#[derive(Debug, Deserialize)]
struct XmlDefinitions {
    standards: Option<XmlStandards>,
}

#[derive(Debug, Deserialize)]
struct XmlStandards {
    #[serde(rename = "standard", default)]
    standard: Vec<XmlStandard>,
}

#[derive(Debug, Deserialize)]
struct XmlStandard {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    name: String,
    version: Option<String>,
    description: Option<String>,
    owner: Option<String>,
    requirements: Option<XmlRequirements>,
    levels: Option<XmlLevels>,
}

#[derive(Debug, Deserialize)]
struct XmlRequirements {
    #[serde(rename = "requirement", default)]
    requirement: Vec<XmlRequirement>,
}

#[derive(Debug, Deserialize)]
struct XmlRequirement {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    identifier: String,
    title: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlLevels {
    #[serde(rename = "level", default)]
    level: Vec<XmlLevel>,
}

#[derive(Debug, Deserialize)]
struct XmlLevel {
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    identifier: String,
    title: Option<String>,
    description: Option<String>,
    requirements: Option<XmlLevelRequirements>,
}

#[derive(Debug, Deserialize)]
struct XmlLevelRequirements {
    #[serde(rename = "requirement", default)]
    requirement: Vec<String>,
}

fn bom_ref_or_generated(value: Option<String>) -> BomRef {
    value.map_or_else(BomRef::generate, BomRef::new)
}

fn convert_metadata(wire: XmlMetadata) -> Result<Metadata> {
    let mut metadata = Metadata::default();
    if let Some(timestamp) = wire.timestamp {
        let parsed = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| Error::invalid_structure(format!("bad timestamp: {e}")))?;
        metadata.timestamp = Some(parsed.with_timezone(&Utc));
    }
    if let Some(tools) = wire.tools {
        metadata.tools = convert_tools(tools)?;
    }
    if let Some(authors) = wire.authors {
        metadata.authors = authors.author.into_iter().map(convert_contact).collect();
    }
    if let Some(component) = wire.component {
        metadata.component = Some(convert_component(component)?);
    }
    metadata.manufacture = wire.manufacture.map(convert_org);
    metadata.supplier = wire.supplier.map(convert_org);
    if let Some(licenses) = wire.licenses {
        metadata.licenses = convert_licenses(licenses)?;
    }
    Ok(metadata)
}

fn convert_tools(wire: XmlTools) -> Result<Tools> {
    let tools = wire
        .tool
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
    let components = wire
        .components
        .map(|c| {
            c.component
                .into_iter()
                .map(convert_component)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();
    let services = wire
        .services
        .map(|s| {
            s.service
                .into_iter()
                .map(convert_service)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();
    if !tools.is_empty() && (!components.is_empty() || !services.is_empty()) {
        return Err(Error::mutually_exclusive(
            "tools section mixes legacy tool entries with typed collections",
        ));
    }
    Ok(Tools::from_parts(tools, components, services))
}

fn convert_component(wire: XmlComponent) -> Result<Component> {
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
    component.hashes = convert_hashes(wire.hashes)?;
    if let Some(licenses) = wire.licenses {
        component.licenses = convert_licenses(licenses)?;
    }
    component.external_references = convert_external_references(wire.external_references);
    if let Some(properties) = wire.properties {
        component.properties = properties
            .property
            .into_iter()
            .map(|p| Property::new(p.name, p.value))
            .collect();
    }
    if let Some(children) = wire.components {
        component.components = children
            .component
            .into_iter()
            .map(convert_component)
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(component)
}

fn convert_service(wire: XmlService) -> Result<Service> {
    let mut service = Service::new(wire.name);
    service.bom_ref = bom_ref_or_generated(wire.bom_ref);
    service.provider = wire.provider.map(convert_org);
    service.group = wire.group;
    service.version = wire.version;
    service.description = wire.description;
    if let Some(licenses) = wire.licenses {
        service.licenses = convert_licenses(licenses)?;
    }
    service.external_references = convert_external_references(wire.external_references);
    if let Some(children) = wire.services {
        service.services = children
            .service
            .into_iter()
            .map(convert_service)
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(service)
}

fn convert_licenses(wire: XmlLicenses) -> Result<Licenses> {
    let mut licenses = Licenses::new();
    for license in wire.license {
        let mut converted = DisjunctiveLicense::new(license.id, license.name)?;
        converted.text = license.text;
        converted.url = license.url;
        licenses.push(LicenseChoice::License(converted));
    }
    for expression in wire.expression {
        match LicenseExpression::try_new(expression) {
            Ok(expr) => licenses.push(LicenseChoice::Expression(expr)),
            Err(Error::InvalidLicenseExpression(raw)) => {
                tracing::warn!(expression = %raw, "unparseable license expression, demoting to name");
                licenses.push(LicenseChoice::License(DisjunctiveLicense::named(raw)));
            }
            Err(other) => return Err(other),
        }
    }
    Ok(licenses)
}

fn convert_hashes(wire: Option<XmlHashes>) -> Result<Vec<Hash>> {
    wire.map(|hashes| {
        hashes
            .hash
            .into_iter()
            .map(|h| {
                let alg: HashAlgorithm = h.alg.parse()?;
                Ok(Hash::new(alg, h.content))
            })
            .collect::<Result<Vec<_>>>()
    })
    .transpose()
    .map(Option::unwrap_or_default)
}

fn convert_external_references(wire: Option<XmlExternalReferences>) -> Vec<ExternalReference> {
    wire.map(|refs| {
        refs.reference
            .into_iter()
            .map(|r| {
                let mut reference =
                    ExternalReference::new(ExternalReferenceType::from_wire(&r.ref_type), r.url);
                reference.comment = r.comment;
                reference.hashes = convert_hashes(r.hashes).unwrap_or_default();
                reference
            })
            .collect()
    })
    .unwrap_or_default()
}

fn convert_org(wire: XmlOrg) -> OrganizationalEntity {
    OrganizationalEntity {
        name: wire.name,
        urls: wire.url,
        contacts: wire.contact.into_iter().map(convert_contact).collect(),
    }
}

fn convert_contact(wire: XmlContact) -> OrganizationalContact {
    OrganizationalContact {
        name: wire.name,
        email: wire.email,
        phone: wire.phone,
    }
}

fn convert_vulnerability(wire: XmlVulnerability) -> Vulnerability {
    let mut vuln = Vulnerability::new(wire.id);
    vuln.bom_ref = bom_ref_or_generated(wire.bom_ref);
    vuln.source = wire.source.map(|s| VulnerabilitySource {
        name: s.name,
        url: s.url,
    });
    vuln.description = wire.description;
    vuln.recommendation = wire.recommendation;
    if let Some(ratings) = wire.ratings {
        vuln.ratings = ratings
            .rating
            .into_iter()
            .map(|r| VulnerabilityRating {
                score: r.score,
                severity: r.severity.as_deref().map(Severity::from_wire),
                method: r.method,
                vector: r.vector,
            })
            .collect();
    }
    if let Some(cwes) = wire.cwes {
        vuln.cwes = cwes.cwe;
    }
    if let Some(affects) = wire.affects {
        vuln.affects = affects
            .target
            .into_iter()
            .map(|t| BomRef::new(t.target_ref))
            .collect();
    }
    vuln
}

fn convert_standard(wire: XmlStandard) -> Standard {
    let mut standard = Standard::new(wire.name);
    standard.bom_ref = bom_ref_or_generated(wire.bom_ref);
    standard.version = wire.version;
    standard.description = wire.description;
    standard.owner = wire.owner;
    if let Some(requirements) = wire.requirements {
        standard.requirements = requirements
            .requirement
            .into_iter()
            .map(|r| {
                let mut req = Requirement::new(r.identifier);
                req.bom_ref = bom_ref_or_generated(r.bom_ref);
                req.title = r.title;
                req.text = r.text;
                req
            })
            .collect();
    }
    if let Some(levels) = wire.levels {
        standard.levels = levels
            .level
            .into_iter()
            .map(|l| {
                let mut level = Level::new(l.identifier);
                level.bom_ref = bom_ref_or_generated(l.bom_ref);
                level.title = l.title;
                level.description = l.description;
                if let Some(requirements) = l.requirements {
                    level.requirements =
                        requirements.requirement.into_iter().map(BomRef::new).collect();
                }
                level
            })
            .collect();
    }
    standard
}
