//! `HttpSource` against a loopback axum server.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use solar_common::{DataLayersResponse, LayerId};
use solar_layers::{HttpSource, LayerConfig, LayerError, LayerOrchestrator, RasterSource};
use test_utils::fixtures::data_layers_json;
use test_utils::{create_dsm_grid, create_roof_mask, GeoTiffBuilder, SampleKind};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn app() -> Router {
    let mask: Bytes = GeoTiffBuilder::new(4, 4)
        .with_band(create_roof_mask(4, 4))
        .with_sample(SampleKind::U8)
        .build()
        .into();
    let dsm: Bytes = GeoTiffBuilder::new(4, 4)
        .with_band(create_dsm_grid(4, 4))
        .build()
        .into();

    Router::new()
        .route("/mask.tif", get(move || async move { mask }))
        .route("/dsm.tif", get(move || async move { dsm }))
        .route(
            "/rgb.tif",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
}

#[tokio::test]
async fn test_fetch_bytes() {
    let base = serve(app()).await;
    let source = HttpSource::new(&LayerConfig::default()).unwrap();

    let body = source.fetch(&format!("{}/mask.tif", base)).await.unwrap();
    assert_eq!(&body[..2], b"II");
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let base = serve(app()).await;
    let source = HttpSource::new(&LayerConfig::default()).unwrap();

    let err = source.fetch(&format!("{}/rgb.tif", base)).await.unwrap_err();
    match err {
        LayerError::Transport { url, message } => {
            assert!(url.ends_with("/rgb.tif"));
            assert!(message.contains("500"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = source.fetch(&format!("{}/nope.tif", base)).await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpSource::new(&LayerConfig::default()).unwrap();
    let err = source.fetch(&format!("http://{}/mask.tif", addr)).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_dsm_layer_over_http() {
    let base = serve(app()).await;
    let response = DataLayersResponse::from_json(&data_layers_json(&base)).unwrap();
    let config = LayerConfig::default();
    let source = HttpSource::new(&config).unwrap();

    let layer = LayerOrchestrator::new(Arc::new(source), config)
        .get_layer(LayerId::Dsm, &response)
        .await
        .unwrap();
    assert_eq!(layer.bitmaps.len(), 1);
    assert_eq!(layer.bitmaps[0].width(), 4);
    assert_eq!(layer.legend.unwrap().min_label, "10.0 m");

    let config = LayerConfig::default();
    let err = LayerOrchestrator::new(Arc::new(HttpSource::new(&config).unwrap()), config)
        .get_layer(LayerId::Rgb, &response)
        .await
        .unwrap_err();
    assert!(err.is_transport());
}
