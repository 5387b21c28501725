//! Generator configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CdkError, CdkResult};

/// How resource names are disambiguated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// Every name carries an ordinal: `Server1`, `Server2`.
    #[default]
    Counted,
    /// First use is bare, later uses get an ordinal: `Server`, `Server1`.
    Bare,
}

/// A named service with its default port and rule description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub port: u16,
    pub label: String,
}

impl Service {
    pub fn new(name: impl Into<String>, port: u16, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port,
            label: label.into(),
        }
    }
}

/// Default ports and descriptions for network relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub services: Vec<Service>,
    /// Description used when neither the port nor the service is known.
    pub fallback_label: String,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self {
            services: vec![
                Service::new("ssh", 22, "SSH"),
                Service::new("web", 80, "Web Server"),
                Service::new("http", 80, "Web Server"),
                Service::new("https", 443, "HTTPS"),
                Service::new("mysql", 3306, "MySQL"),
                Service::new("postgres", 5432, "Postgres"),
                Service::new("database", 3306, "MySQL"),
            ],
            fallback_label: "Unknown".to_string(),
        }
    }
}

impl ServiceCatalog {
    /// Catalog with no services; every unlabeled edge must carry ports.
    pub fn empty() -> Self {
        Self {
            services: Vec::new(),
            fallback_label: "Unknown".to_string(),
        }
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Default port of a named service.
    pub fn port_for(&self, name: &str) -> Option<u16> {
        self.service(name).map(|s| s.port)
    }

    /// Rule description for a port, falling back to the service label.
    pub fn label_for(&self, port: u16, service: Option<&str>) -> &str {
        self.services
            .iter()
            .find(|s| s.port == port)
            .or_else(|| service.and_then(|name| self.service(name)))
            .map(|s| s.label.as_str())
            .unwrap_or(self.fallback_label.as_str())
    }

    /// Add or replace a service.
    pub fn insert(&mut self, service: Service) {
        match self.services.iter_mut().find(|s| s.name.eq_ignore_ascii_case(&service.name)) {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
    }
}

/// Stack generator configuration.
///
/// Every field has an opinionated default, so configuration files only need
/// to list what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Python class name of the generated stack.
    pub stack_class: String,
    pub naming: NamingScheme,
    /// Place uncontained instances and databases in a generated network.
    pub implicit_vpc: bool,
    pub nat_gateways: u32,
    pub instance_type: String,
    pub database_instance_type: String,
    /// Database storage in GiB.
    pub allocated_storage: u32,
    pub database_name_prefix: String,
    /// AWS managed policy attached to every instance role.
    pub managed_policy: String,
    pub default_availability_zone: String,
    pub services: ServiceCatalog,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            stack_class: "CdkWorkshopStack".to_string(),
            naming: NamingScheme::default(),
            implicit_vpc: true,
            nat_gateways: 1,
            instance_type: "t3.nano".to_string(),
            database_instance_type: "t3.micro".to_string(),
            allocated_storage: 10,
            database_name_prefix: "hermes".to_string(),
            managed_policy: "AmazonSSMManagedInstanceCore".to_string(),
            default_availability_zone: "us-east-1".to_string(),
            services: ServiceCatalog::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_implicit_vpc(mut self, enabled: bool) -> Self {
        self.implicit_vpc = enabled;
        self
    }

    pub fn with_stack_class(mut self, class: impl Into<String>) -> Self {
        self.stack_class = class.into();
        self
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    pub fn with_services(mut self, services: ServiceCatalog) -> Self {
        self.services = services;
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, port: u16, label: impl Into<String>) -> Self {
        self.services.insert(Service::new(name, port, label));
        self
    }

    /// Load configuration from a YAML or TOML file.
    pub fn from_file(path: &Path) -> CdkResult<Self> {
        debug!("Loading generator configuration from {:?}", path);
        let content = fs::read_to_string(path)?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(CdkError::Config(format!(
                    "unsupported configuration file: {}",
                    path.display()
                )))
            }
        };
        Self::validate(&config)?;
        Ok(config)
    }

    /// Reject values that cannot be rendered into a stack program.
    pub fn validate(&self) -> CdkResult<()> {
        let mut chars = self.stack_class.chars();
        let is_identifier = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_identifier {
            return Err(CdkError::Config(format!(
                "stack_class '{}' is not a valid class name",
                self.stack_class
            )));
        }

        if let Some(service) = self.services.services.iter().find(|s| s.port == 0) {
            return Err(CdkError::Config(format!(
                "service '{}' has port 0",
                service.name
            )));
        }
        Ok(())
    }

    /// Save configuration to a YAML file.
    pub fn to_file(&self, path: &Path) -> CdkResult<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_catalog_labels() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.label_for(22, None), "SSH");
        assert_eq!(catalog.label_for(80, None), "Web Server");
        assert_eq!(catalog.label_for(3306, None), "MySQL");
        assert_eq!(catalog.label_for(5432, None), "Postgres");
        assert_eq!(catalog.label_for(1, None), "Unknown");
        assert_eq!(catalog.label_for(8080, Some("web")), "Web Server");
    }

    #[test]
    fn test_service_lookup_is_case_insensitive() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.port_for("HTTPS"), Some(443));
        assert_eq!(catalog.port_for("gopher"), None);
    }

    #[test]
    fn test_with_service_replaces_existing() {
        let config = GeneratorConfig::default().with_service("web", 8080, "Web App");
        assert_eq!(config.services.port_for("web"), Some(8080));
        assert_eq!(config.services.label_for(8080, None), "Web App");
    }

    #[test]
    fn test_partial_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hermes.toml");
        fs::write(&path, "naming = \"bare\"\nimplicit_vpc = false\n").unwrap();

        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.naming, NamingScheme::Bare);
        assert!(!config.implicit_vpc);
        assert_eq!(config.instance_type, "t3.nano");
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hermes.yaml");
        let config = GeneratorConfig::default()
            .with_stack_class("DemoStack")
            .with_service("redis", 6379, "Redis");

        config.to_file(&path).unwrap();
        let loaded = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_stack_class_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hermes.yaml");
        fs::write(&path, "stack_class: \"My Stack\"\n").unwrap();
        assert!(matches!(GeneratorConfig::from_file(&path), Err(CdkError::Config(_))));

        assert!(GeneratorConfig::default().with_stack_class("_Shop2").validate().is_ok());
        assert!(GeneratorConfig::default().with_stack_class("2Shop").validate().is_err());
    }

    #[test]
    fn test_zero_service_port_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hermes.toml");
        fs::write(
            &path,
            "[services]\nfallback_label = \"Unknown\"\n\n[[services.services]]\nname = \"app\"\nport = 0\nlabel = \"App\"\n",
        )
        .unwrap();

        match GeneratorConfig::from_file(&path) {
            Err(CdkError::Config(message)) => assert!(message.contains("'app'")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hermes.ini");
        fs::write(&path, "").unwrap();
        assert!(matches!(GeneratorConfig::from_file(&path), Err(CdkError::Config(_))));
    }
}
