//! Marketplace lookup and record normalization.
//!
//! The gallery API answers an `extensionquery` POST with a nested result
//! set. [`Marketplace::get_extension`] extracts the first extension record
//! and [`MarketplaceExtension::from_record`] flattens it into the fields vsc
//! uses. Only the first (current) version of a record is read.

use serde::{Deserialize, Serialize};
use vsc_tunnel::{Channel, CurlRequest};

use crate::error::{Error, Result};
use crate::id::ExtensionId;

/// Gallery query endpoint
pub const MARKETPLACE_QUERY_URL: &str =
    "https://marketplace.visualstudio.com/_apis/public/gallery/extensionquery";

/// Asset type of the extension manifest (`package.json`)
pub const ASSET_MANIFEST: &str = "Microsoft.VisualStudio.Code.Manifest";
/// Asset type of the packaged `.vsix`
pub const ASSET_VSIX_PACKAGE: &str = "Microsoft.VisualStudio.Services.VSIXPackage";
/// Property holding the supported editor engine range
pub const PROPERTY_ENGINE: &str = "Microsoft.VisualStudio.Code.Engine";
/// Property listing the members of an extension pack
pub const PROPERTY_EXTENSION_PACK: &str = "Microsoft.VisualStudio.Code.ExtensionPack";
/// Property listing extension dependencies
pub const PROPERTY_EXTENSION_DEPENDENCIES: &str = "Microsoft.VisualStudio.Code.ExtensionDependencies";

/// Filter type matching an extension by `publisher.package`
const FILTER_EXTENSION_NAME: u32 = 7;
/// IncludeVersions | IncludeFiles | IncludeVersionProperties | IncludeAssetUri
/// | IncludeStatistics | IncludeLatestVersionOnly
const QUERY_FLAGS: u32 = 914;

/// Raw extension record as returned by the gallery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryExtension {
    pub extension_id: String,
    pub extension_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub publisher: GalleryPublisher,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub statistics: Vec<Statistic>,
    #[serde(default)]
    pub versions: Vec<GalleryVersion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPublisher {
    pub publisher_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryVersion {
    pub version: String,
    #[serde(default)]
    pub files: Vec<GalleryFile>,
    #[serde(default)]
    pub properties: Vec<GalleryProperty>,
    #[serde(default)]
    pub asset_uri: Option<String>,
    #[serde(default)]
    pub fallback_asset_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryFile {
    pub asset_type: String,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryProperty {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A usage statistic (installs, rating, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    pub statistic_name: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    extensions: Vec<GalleryExtension>,
}

/// Client for the marketplace gallery API, issuing requests through a channel.
pub struct Marketplace<'c> {
    channel: &'c dyn Channel,
}

impl<'c> Marketplace<'c> {
    pub fn new(channel: &'c dyn Channel) -> Self {
        Self { channel }
    }

    /// JSON body of a query for one extension by unique id
    pub fn query_body(unique_id: &str) -> String {
        serde_json::json!({
            "filters": [{
                "criteria": [{ "filterType": FILTER_EXTENSION_NAME, "value": unique_id }],
                "pageNumber": 1,
                "pageSize": 1,
                "sortBy": 0,
                "sortOrder": 0
            }],
            "assetTypes": [],
            "flags": QUERY_FLAGS
        })
        .to_string()
    }

    /// Fetch the raw record for `unique_id`.
    ///
    /// Fails with [`Error::NotFound`] when the gallery returns no record and
    /// with [`Error::TransportFailure`] when the request exits non-zero.
    pub fn get_extension(&self, unique_id: &ExtensionId) -> Result<GalleryExtension> {
        let request = CurlRequest::post(MARKETPLACE_QUERY_URL, Self::query_body(unique_id.as_str()))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json;api-version=3.0-preview.1");

        tracing::debug!(%unique_id, url = MARKETPLACE_QUERY_URL, "Querying marketplace");
        let output = self.channel.run(&request.into_command())?;
        if !output.success() {
            tracing::error!(
                %unique_id,
                url = MARKETPLACE_QUERY_URL,
                exited = output.exited,
                "Marketplace query failed: {}",
                output.stderr.trim()
            );
            return Err(Error::TransportFailure {
                url: MARKETPLACE_QUERY_URL.to_string(),
                exited: output.exited,
                stderr: output.stderr.trim().to_string(),
            });
        }

        parse_query_response(&output.stdout)?
            .ok_or_else(|| Error::NotFound(unique_id.to_string()))
    }

    /// Fetch and normalize the record for `unique_id`
    pub fn get(&self, unique_id: &ExtensionId) -> Result<MarketplaceExtension> {
        MarketplaceExtension::from_record(self.get_extension(unique_id)?)
    }
}

/// First extension record of a query response, if any.
pub fn parse_query_response(body: &str) -> Result<Option<GalleryExtension>> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| Error::InvalidResponse {
            source_name: "marketplace".to_string(),
            reason: e.to_string(),
        })?;
    Ok(response
        .results
        .into_iter()
        .flat_map(|result| result.extensions)
        .next())
}

/// Asset URIs of the current version.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AssetUris {
    pub asset: Option<String>,
    pub asset_fallback: Option<String>,
    pub manifest: Option<String>,
    pub vsix_package: Option<String>,
}

/// An extension downloaded from the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketplaceExtension {
    pub unique_id: ExtensionId,
    pub extension_id: String,
    pub extension_name: String,
    pub display_name: Option<String>,
    pub publisher_name: String,
    pub description: Option<String>,
    pub stats: Vec<Statistic>,
    pub version: String,
    pub uri: AssetUris,
    pub code_engine: Option<String>,
    pub extension_pack: Option<Vec<String>>,
    pub extension_dependencies: Option<Vec<String>>,
}

impl MarketplaceExtension {
    /// Normalize a gallery record. Only `versions[0]` is read.
    pub fn from_record(record: GalleryExtension) -> Result<Self> {
        let unique_id =
            ExtensionId::from_parts(&record.publisher.publisher_name, &record.extension_name)?;
        let version = record
            .versions
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse {
                source_name: "marketplace".to_string(),
                reason: format!("record for '{unique_id}' has no versions"),
            })?;

        Ok(Self {
            extension_id: record.extension_id,
            extension_name: record.extension_name,
            display_name: record.display_name,
            publisher_name: record.publisher.publisher_name,
            description: record.short_description,
            stats: record.statistics,
            uri: AssetUris {
                asset: version.asset_uri.clone(),
                asset_fallback: version.fallback_asset_uri.clone(),
                manifest: file_source(&version.files, ASSET_MANIFEST),
                vsix_package: file_source(&version.files, ASSET_VSIX_PACKAGE),
            },
            code_engine: property_value(&version.properties, PROPERTY_ENGINE),
            extension_pack: property_value(&version.properties, PROPERTY_EXTENSION_PACK)
                .map(|v| split_id_list(&v)),
            extension_dependencies: property_value(
                &version.properties,
                PROPERTY_EXTENSION_DEPENDENCIES,
            )
            .map(|v| split_id_list(&v)),
            version: version.version,
            unique_id,
        })
    }

    /// The `.vsix` package URL, which is what gets downloaded
    pub fn download_url(&self) -> Option<&str> {
        self.uri.vsix_package.as_deref()
    }

    /// Install count, when the gallery reports one
    pub fn install_count(&self) -> Option<u64> {
        self.stats
            .iter()
            .find(|s| s.statistic_name == "install")
            .map(|s| s.value as u64)
    }
}

/// `source` of the first file with the given asset type.
pub fn file_source(files: &[GalleryFile], asset_type: &str) -> Option<String> {
    files
        .iter()
        .find(|f| f.asset_type == asset_type)
        .map(|f| f.source.clone())
}

/// `value` of the first property with the given key.
pub fn property_value(properties: &[GalleryProperty], key: &str) -> Option<String> {
    properties
        .iter()
        .find(|p| p.key == key)
        .map(|p| p.value.clone())
}

fn split_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vsc_test_utils::{LogCapture, ScriptedChannel};
    use vsc_tunnel::CommandOutput;

    const CMAKE_RESPONSE: &str = r#"{
      "results": [{
        "extensions": [{
          "extensionId": "2be7cf14-2603-402e-9771-fd79df83cdf8",
          "extensionName": "cmake",
          "displayName": "CMake",
          "shortDescription": "CMake langage support for Visual Studio Code",
          "publisher": {"publisherName": "twxs", "displayName": "twxs"},
          "statistics": [
            {"statisticName": "install", "value": 4000000},
            {"statisticName": "averagerating", "value": 4.2}
          ],
          "versions": [
            {
              "version": "0.0.17",
              "assetUri": "https://twxs.gallerycdn.vsassets.io/extensions/twxs/cmake/0.0.17/1",
              "fallbackAssetUri": "https://twxs.gallery.vsassets.io/_apis/public/gallery/publisher/twxs/extension/cmake/0.0.17/assetbyname",
              "files": [
                {"assetType": "Microsoft.VisualStudio.Code.Manifest", "source": "https://cdn/manifest"},
                {"assetType": "Microsoft.VisualStudio.Services.VSIXPackage", "source": "https://cdn/cmake.vsix"},
                {"assetType": "Microsoft.VisualStudio.Services.VSIXPackage", "source": "https://cdn/second.vsix"}
              ],
              "properties": [
                {"key": "Microsoft.VisualStudio.Code.Engine", "value": "^1.5.0"},
                {"key": "Microsoft.VisualStudio.Code.ExtensionDependencies", "value": ""},
                {"key": "Microsoft.VisualStudio.Code.ExtensionPack", "value": "ms-vscode.cmake-tools, twxs.cmake-extras"}
              ]
            },
            {"version": "0.0.16", "files": [], "properties": []}
          ]
        }]
      }]
    }"#;

    fn cmake_record() -> GalleryExtension {
        parse_query_response(CMAKE_RESPONSE).unwrap().unwrap()
    }

    #[test]
    fn test_normalize_record() {
        let ext = MarketplaceExtension::from_record(cmake_record()).unwrap();

        assert_eq!(ext.unique_id.as_str(), "twxs.cmake");
        assert_eq!(ext.extension_id, "2be7cf14-2603-402e-9771-fd79df83cdf8");
        assert_eq!(ext.display_name.as_deref(), Some("CMake"));
        assert_eq!(ext.publisher_name, "twxs");
        assert_eq!(ext.version, "0.0.17");
        assert_eq!(ext.uri.manifest.as_deref(), Some("https://cdn/manifest"));
        assert_eq!(ext.download_url(), Some("https://cdn/cmake.vsix"));
        assert!(ext.uri.asset.as_deref().unwrap().ends_with("/0.0.17/1"));
        assert_eq!(ext.code_engine.as_deref(), Some("^1.5.0"));
        assert_eq!(
            ext.extension_pack,
            Some(vec![
                "ms-vscode.cmake-tools".to_string(),
                "twxs.cmake-extras".to_string()
            ])
        );
        assert_eq!(ext.extension_dependencies, Some(vec![]));
        assert_eq!(ext.install_count(), Some(4_000_000));
    }

    #[test]
    fn test_absent_keys_yield_none() {
        let files = vec![GalleryFile {
            asset_type: "Microsoft.VisualStudio.Services.Icons.Default".into(),
            source: "icon".into(),
        }];
        let properties = vec![GalleryProperty {
            key: "Microsoft.VisualStudio.Code.Repository".into(),
            value: "https://github.com/twxs/vs.language.cmake".into(),
        }];

        assert_eq!(file_source(&files, ASSET_MANIFEST), None);
        assert_eq!(file_source(&files, ASSET_VSIX_PACKAGE), None);
        assert_eq!(property_value(&properties, PROPERTY_ENGINE), None);
        assert_eq!(property_value(&properties, PROPERTY_EXTENSION_PACK), None);
        assert_eq!(property_value(&[], PROPERTY_EXTENSION_DEPENDENCIES), None);
    }

    #[test]
    fn test_record_without_optional_metadata() {
        let body = r#"{"results": [{"extensions": [{
            "extensionId": "id", "extensionName": "bare",
            "publisher": {"publisherName": "acme"},
            "versions": [{"version": "1.0.0"}]
        }]}]}"#;
        let ext =
            MarketplaceExtension::from_record(parse_query_response(body).unwrap().unwrap()).unwrap();
        assert_eq!(ext.unique_id.as_str(), "acme.bare");
        assert_eq!(ext.download_url(), None);
        assert_eq!(ext.code_engine, None);
        assert_eq!(ext.extension_pack, None);
        assert_eq!(ext.extension_dependencies, None);
        assert_eq!(ext.uri, AssetUris::default());
    }

    #[test]
    fn test_record_without_versions_is_invalid() {
        let body = r#"{"results": [{"extensions": [{
            "extensionId": "id", "extensionName": "bare",
            "publisher": {"publisherName": "acme"}
        }]}]}"#;
        let err = MarketplaceExtension::from_record(parse_query_response(body).unwrap().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }), "got: {err:?}");
    }

    #[test]
    fn test_query_body_filters_by_name() {
        let body: serde_json::Value =
            serde_json::from_str(&Marketplace::query_body("twxs.cmake")).unwrap();
        assert_eq!(body["filters"][0]["criteria"][0]["filterType"], 7);
        assert_eq!(body["filters"][0]["criteria"][0]["value"], "twxs.cmake");
        assert_eq!(body["flags"], 914);
    }

    #[test]
    fn test_get_extension_posts_query() {
        let channel = ScriptedChannel::new()
            .respond("extensionquery", CommandOutput::ok(CMAKE_RESPONSE));
        let id = ExtensionId::parse("twxs.cmake").unwrap();

        let ext = Marketplace::new(&channel).get(&id).unwrap();
        assert_eq!(ext.version, "0.0.17");

        let commands = channel.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].args.iter().any(|a| a == "POST"));
        assert!(commands[0].args.iter().any(|a| a.contains(r#""value":"twxs.cmake""#)));
    }

    #[test]
    fn test_get_extension_empty_result_is_not_found() {
        let channel = ScriptedChannel::new().respond(
            "extensionquery",
            CommandOutput::ok(r#"{"results": [{"extensions": []}]}"#),
        );
        let id = ExtensionId::parse("nobody.nothing").unwrap();

        let err = Marketplace::new(&channel).get_extension(&id).unwrap_err();
        assert!(
            matches!(err, Error::NotFound(ref missing) if missing == "nobody.nothing"),
            "expected NotFound, got: {err:?}"
        );
    }

    #[test]
    fn test_get_extension_transport_failure() {
        let logs = LogCapture::new();
        let channel = ScriptedChannel::new().respond(
            "extensionquery",
            CommandOutput::failed(22, "The requested URL returned error: 503"),
        );
        let id = ExtensionId::parse("twxs.cmake").unwrap();

        let err = logs
            .in_scope(|| Marketplace::new(&channel).get_extension(&id))
            .unwrap_err();
        assert!(
            matches!(err, Error::TransportFailure { exited: 22, .. }),
            "expected TransportFailure, got: {err:?}"
        );
        assert!(logs.lines_at("ERROR")[0].contains("503"));
    }

    #[test]
    fn test_query_posts_to_gallery_endpoint() {
        let channel = ScriptedChannel::new()
            .respond("extensionquery", CommandOutput::ok(CMAKE_RESPONSE));
        let id = ExtensionId::parse("twxs.cmake").unwrap();

        let ext = Marketplace::new(&channel).get(&id).unwrap();
        assert_eq!(ext.unique_id, id);

        let lines = channel.command_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("--request POST"), "{}", lines[0]);
        assert!(lines[0].contains(MARKETPLACE_QUERY_URL), "{}", lines[0]);
    }
}
