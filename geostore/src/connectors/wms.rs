use geostore_core::BoxedError;
use geostore_core::resources::{Capabilities, ServiceLayer, WebMapServer};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::connectors::{ConnectorError, ConnectorResult};

/// A WMS reached over HTTP. The capabilities document is fetched on every call.
#[derive(Debug)]
pub struct HttpWebMapServer {
    client: Client,
    url: String,
}

impl HttpWebMapServer {
    pub fn new(url: String) -> ConnectorResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("geostore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConnectorError::HttpError(e, url.clone()))?;
        Ok(Self { client, url })
    }
}

impl WebMapServer for HttpWebMapServer {
    fn capabilities(&mut self) -> Result<Capabilities, BoxedError> {
        debug!("Fetching capabilities from {}", self.url);
        let xml = self
            .client
            .get(&self.url)
            .send()
            .and_then(Response::error_for_status)
            .and_then(Response::text)
            .map_err(|e| ConnectorError::HttpError(e, self.url.clone()))?;
        Ok(parse_capabilities(&xml)?)
    }
}

/// Extracts every `Layer` of a WMS capabilities document, in document order.
///
/// Only the `Name` and `Title` children of a layer are read, nested layers are
/// returned after their parent.
pub fn parse_capabilities(xml: &str) -> ConnectorResult<Capabilities> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut open_layers: Vec<usize> = Vec::new();
    let mut layers: Vec<ServiceLayer> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"Layer" {
                    open_layers.push(layers.len());
                    layers.push(ServiceLayer::default());
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"Layer" {
                    layers.push(ServiceLayer::default());
                }
            }
            Event::End(_) => {
                if path.pop().as_deref() == Some(b"Layer".as_slice()) {
                    open_layers.pop();
                }
            }
            Event::Text(text) => {
                if let [.., parent, field] = path.as_slice()
                    && parent == b"Layer"
                    && let Some(layer) = open_layers.last().and_then(|&i| layers.get_mut(i))
                {
                    let value = text.unescape().map_err(quick_xml::Error::from)?.into_owned();
                    match field.as_slice() {
                        b"Name" => layer.name = Some(value),
                        b"Title" => layer.title = Some(value),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Capabilities { layers })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn layer(name: Option<&str>, title: &str) -> ServiceLayer {
        ServiceLayer {
            name: name.map(ToString::to_string),
            title: Some(title.to_string()),
        }
    }

    #[test]
    fn nested_layers_in_document_order() {
        let xml = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
              <Service>
                <Name>WMS</Name>
                <Title>Example</Title>
              </Service>
              <Capability>
                <Layer>
                  <Title>Root &amp; friends</Title>
                  <Layer queryable="1">
                    <Name>topp:states</Name>
                    <Title>USA Population</Title>
                    <Style>
                      <Name>population</Name>
                      <Title>Population</Title>
                    </Style>
                  </Layer>
                  <Layer>
                    <Name>nurc:dem</Name>
                    <Title>Elevation</Title>
                  </Layer>
                </Layer>
              </Capability>
            </WMS_Capabilities>
        "#};
        let capabilities = parse_capabilities(xml).unwrap();
        assert_eq!(
            capabilities.layers,
            [
                layer(None, "Root & friends"),
                layer(Some("topp:states"), "USA Population"),
                layer(Some("nurc:dem"), "Elevation"),
            ]
        );
    }

    #[test]
    fn prefixed_elements() {
        let xml = r#"<wms:WMS_Capabilities xmlns:wms="http://www.opengis.net/wms"><wms:Capability><wms:Layer><wms:Name>roads</wms:Name></wms:Layer></wms:Capability></wms:WMS_Capabilities>"#;
        let layers = parse_capabilities(xml).unwrap().layers;
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name.as_deref(), Some("roads"));
    }

    #[test]
    fn malformed_document() {
        let err = parse_capabilities("<Capability><Layer></Capability>").unwrap_err();
        assert!(matches!(err, ConnectorError::CapabilitiesError(_)));
    }
}
