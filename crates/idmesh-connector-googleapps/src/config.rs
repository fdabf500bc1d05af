//! Connector configuration.

use idmesh_connector::error::{ConnectorError, ConnectorResult};

use crate::schema::{self, CustomSchema};

/// Default customer alias understood by the Directory API.
pub const MY_CUSTOMER: &str = "my_customer";

const DEFAULT_DIRECTORY_BASE: &str = "https://admin.googleapis.com/admin/directory/v1";
const DEFAULT_LICENSING_BASE: &str = "https://licensing.googleapis.com/licensing/v1";

/// Projection requested on account reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Projection {
    /// Core fields only.
    #[default]
    Basic,
    /// Core fields plus custom schemas.
    Full,
}

impl Projection {
    /// Query-parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Full => "full",
        }
    }
}

/// Configuration for [`GoogleAppsConnector`](crate::GoogleAppsConnector).
#[derive(Debug, Clone)]
pub struct GoogleAppsConfig {
    /// Customer account to operate on.
    pub customer_id: String,
    /// Domain scoping group-membership lookups. `None` falls back to
    /// customer-wide queries.
    pub domain: Option<String>,
    /// Projection applied to account reads.
    pub projection: Projection,
    /// Custom schema descriptor JSON, when the tenant declares any.
    pub custom_schemas_json: Option<String>,
    /// Licensing product the connector manages.
    pub product_id: Option<String>,
    /// SKUs of the managed product.
    pub sku_ids: Vec<String>,
    /// Remove configured SKU licenses when an account is disabled.
    pub remove_license_on_disable: bool,
    /// Directory API base URL. Overridable for tests.
    pub directory_base_url: String,
    /// Licensing API base URL. Overridable for tests.
    pub licensing_base_url: String,
}

impl Default for GoogleAppsConfig {
    fn default() -> Self {
        Self {
            customer_id: MY_CUSTOMER.to_string(),
            domain: None,
            projection: Projection::Basic,
            custom_schemas_json: None,
            product_id: None,
            sku_ids: Vec::new(),
            remove_license_on_disable: false,
            directory_base_url: DEFAULT_DIRECTORY_BASE.to_string(),
            licensing_base_url: DEFAULT_LICENSING_BASE.to_string(),
        }
    }
}

impl GoogleAppsConfig {
    /// Start building a configuration.
    pub fn builder() -> GoogleAppsConfigBuilder {
        GoogleAppsConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.customer_id.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "customer_id must not be empty".to_string(),
            });
        }
        if self.remove_license_on_disable && self.product_id.is_none() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "remove_license_on_disable requires a product_id".to_string(),
            });
        }
        if let Some(json) = &self.custom_schemas_json {
            schema::parse_descriptor(json)?;
        }
        Ok(())
    }

    /// Parsed custom schemas. Empty when none are configured.
    pub fn custom_schemas(&self) -> ConnectorResult<Vec<CustomSchema>> {
        match &self.custom_schemas_json {
            Some(json) => schema::parse_descriptor(json),
            None => Ok(Vec::new()),
        }
    }
}

/// Builder for [`GoogleAppsConfig`].
#[derive(Debug, Default)]
pub struct GoogleAppsConfigBuilder {
    config: GoogleAppsConfig,
}

impl GoogleAppsConfigBuilder {
    /// Customer account to operate on (defaults to `my_customer`).
    #[must_use]
    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.config.customer_id = customer_id.into();
        self
    }

    /// Domain scoping group-membership lookups.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = Some(domain.into());
        self
    }

    /// Projection applied to account reads.
    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.config.projection = projection;
        self
    }

    /// Custom schema descriptor JSON.
    #[must_use]
    pub fn custom_schemas_json(mut self, json: impl Into<String>) -> Self {
        self.config.custom_schemas_json = Some(json.into());
        self
    }

    /// Licensing product and its SKUs.
    #[must_use]
    pub fn licensing(mut self, product_id: impl Into<String>, sku_ids: Vec<String>) -> Self {
        self.config.product_id = Some(product_id.into());
        self.config.sku_ids = sku_ids;
        self
    }

    /// Remove configured SKU licenses when an account is disabled.
    #[must_use]
    pub fn remove_license_on_disable(mut self, enabled: bool) -> Self {
        self.config.remove_license_on_disable = enabled;
        self
    }

    /// Override the Directory API base URL.
    #[must_use]
    pub fn directory_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.directory_base_url = url.into();
        self
    }

    /// Override the Licensing API base URL.
    #[must_use]
    pub fn licensing_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.licensing_base_url = url.into();
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> ConnectorResult<GoogleAppsConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_public_endpoints() {
        let config = GoogleAppsConfig::builder().build().unwrap();
        assert_eq!(config.customer_id, MY_CUSTOMER);
        assert_eq!(config.projection, Projection::Basic);
        assert!(config.directory_base_url.starts_with("https://admin.googleapis.com"));
        assert!(config.licensing_base_url.starts_with("https://licensing.googleapis.com"));
    }

    #[test]
    fn empty_customer_is_rejected() {
        let err = GoogleAppsConfig::builder().customer_id("  ").build().unwrap_err();
        assert_eq!(err.error_code(), "invalid_configuration");
    }

    #[test]
    fn license_removal_requires_product() {
        let err = GoogleAppsConfig::builder()
            .remove_license_on_disable(true)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_configuration");

        let ok = GoogleAppsConfig::builder()
            .remove_license_on_disable(true)
            .licensing("Google-Apps", vec!["Google-Apps-For-Business".to_string()])
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn custom_schema_json_is_validated_at_build() {
        let err = GoogleAppsConfig::builder()
            .custom_schemas_json("[{broken")
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_configuration");
    }

    #[test]
    fn custom_schemas_parse() {
        let config = GoogleAppsConfig::builder()
            .custom_schemas_json(
                r#"[{"name": "Emp", "type": "object", "innerSchemas": [{"name": "cc", "type": "string"}]}]"#,
            )
            .build()
            .unwrap();
        let schemas = config.custom_schemas().unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].inner_schemas[0].name, "cc");
    }
}
