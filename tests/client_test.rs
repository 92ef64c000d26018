// HTTP contract tests for the control client, against a mock control server.

use std::time::Duration;

use serde_json::json;
use skybridge::client::{EmuClient, ScreenFormat};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

fn client_for(server: &MockServer) -> EmuClient {
    EmuClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn ok_body() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string("ok")
}

#[test]
fn ping_pong() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.ping().unwrap());
}

#[test]
fn ping_unexpected_body_is_false() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(!client.ping().unwrap());
}

#[test]
fn server_error_propagates() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.ping().is_err());
}

#[test]
fn step_sends_frames_and_checks_ok() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/step"))
            .and(query_param("frames", "5"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.step(5).unwrap());
    rt.block_on(server.verify());
}

#[test]
fn run_rejected_body_is_false() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/run"))
            .respond_with(ResponseTemplate::new(200).set_body_string("busy"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(!client.run().unwrap());
}

#[test]
fn read_bytes_decodes_hex_pairs() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_byte"))
            .and(query_param("addr", "ff0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1a2b"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert_eq!(client.read_bytes(&[0xff0], 0).unwrap(), vec![0x1a, 0x2b]);
}

#[test]
fn read_bytes_truncates_trailing_digit() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_byte"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1a2"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert_eq!(client.read_bytes(&[0x100], 0).unwrap(), vec![0x1a]);
}

#[test]
fn read_bytes_sends_one_addr_param_per_address() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_byte"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0102"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert_eq!(
        client.read_bytes(&[0x0200_0000, 0x0200_0001], 9).unwrap(),
        vec![0x01, 0x02]
    );

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("addr".to_string(), "2000000".to_string()),
            ("addr".to_string(), "2000001".to_string()),
            ("map".to_string(), "9".to_string()),
        ]
    );
}

#[test]
fn write_bytes_zero_pads_values() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/write_byte"))
            .and(query_param("2a0", "ff"))
            .and(query_param("100", "0f"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(
        client
            .write_bytes(&[(0x2a0, 0xff), (0x100, 0x0f)], 0)
            .unwrap()
    );
    rt.block_on(server.verify());
}

#[test]
fn press_button_always_releases() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/input"))
            .and(query_param("A", "1"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/input"))
            .and(query_param("A", "0"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.press_button("A", 0.0).unwrap());
    rt.block_on(server.verify());
}

#[test]
fn hold_and_release_buttons_are_batched() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/input"))
            .respond_with(ok_body())
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let buttons = vec!["A".to_string(), "B".to_string()];
    assert!(client.hold_buttons(&buttons).unwrap());
    assert!(client.release_buttons(&buttons).unwrap());

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 2, "one batched call per operation");
    for (request, level) in requests.iter().zip(["1", "0"]) {
        let pairs: Vec<(String, String)> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), level.to_string()),
                ("B".to_string(), level.to_string()),
            ]
        );
    }
}

#[test]
fn release_all_releases_exactly_the_held_subset() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"inputs": {"A": 1, "B": 0, "Up": 1}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/input"))
            .and(query_param("A", "0"))
            .and(query_param("Up", "0"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert_eq!(client.release_all_buttons().unwrap(), vec!["A", "Up"]);

    let requests = rt.block_on(server.received_requests()).unwrap();
    let input_request = requests
        .iter()
        .find(|r| r.url.path() == "/input")
        .expect("one input request");
    assert_eq!(
        input_request.url.query_pairs().count(),
        2,
        "B must be untouched"
    );
    rt.block_on(server.verify());
}

#[test]
fn release_all_is_a_noop_when_nothing_is_held() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"inputs": {"A": 0, "B": 0}})),
            )
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.release_all_buttons().unwrap().is_empty());

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1, "status only, no input call");
}

#[test]
fn get_screen_decodes_the_image() {
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        3,
        image::Rgba([10, 20, 30, 255]),
    ))
    .write_to(&mut png, image::ImageFormat::Png)
    .unwrap();
    let png = png.into_inner();

    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/screen"))
            .and(query_param("format", "png"))
            .and(query_param("embed_state", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let screen = client.get_screen(ScreenFormat::Png, true).unwrap();
    assert_eq!(screen.width(), 4);
    assert_eq!(screen.height(), 3);
}

#[test]
fn get_screen_rejects_non_image_body() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/screen"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.get_screen(ScreenFormat::Png, false).is_err());
}

#[test]
fn get_status_passes_json_through() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"rom-loaded": true, "run-mode": 1})),
            )
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let status = client.get_status().unwrap();
    assert_eq!(status["rom-loaded"], json!(true));
    assert_eq!(status["run-mode"], json!(1));
}

#[test]
fn state_and_rom_endpoints_relay_paths() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/save"))
            .and(query_param("path", "/tmp/slot1.state"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/load"))
            .and(query_param("path", "/tmp/slot1.state"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/load_rom"))
            .and(query_param("path", "/roms/game.gba"))
            .and(query_param("pause", "1"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    assert!(client.save_state("/tmp/slot1.state").unwrap());
    assert!(client.load_state("/tmp/slot1.state").unwrap());
    assert!(client.load_rom("/roms/game.gba", true).unwrap());
    rt.block_on(server.verify());
}
