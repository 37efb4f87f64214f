//! Client/server round trips over localhost UDP.
//!
//! Each test gets its own port triple so the suites can run in parallel.

use radius_client::Client;
use radius_core::auth::encrypt_user_password;
use radius_core::dictionary::Dictionary;
use radius_core::packet::{RadiusMsgType, RadiusPacket, TypeCode};
use radius_core::scalar::integer_to_bytes;
use radius_server::{ClientEntry, Config, Server, SimpleHandler, User};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const DICTIONARY_PATH: &str = "../radius-core/tests/data/integration_dict";
const SECRET: &str = "secret";

async fn spawn_server(auth_port: u16, acct_port: u16, coa_port: u16) {
    let config = Config {
        bind_address: "127.0.0.1".to_string(),
        auth_port,
        acct_port,
        coa_port,
        dictionary_path: DICTIONARY_PATH.to_string(),
        secret: String::new(),
        clients: vec![ClientEntry {
            address: "127.0.0.1".to_string(),
            secret: SECRET.to_string(),
            name: Some("test client".to_string()),
            enabled: true,
        }],
        users: vec![User {
            username: "testing".to_string(),
            password: "password".to_string(),
            reply_attributes: BTreeMap::from([(
                "Reply-Message".to_string(),
                "welcome".to_string(),
            )]),
        }],
        log_level: None,
    };

    let dictionary = Dictionary::from_file(DICTIONARY_PATH).unwrap();
    let handler = Arc::new(SimpleHandler::new(config.users.clone()));
    let server = Server::new(config, dictionary, handler).unwrap();

    tokio::spawn(async move {
        server.run().await.expect("server loop failed");
    });
    // Give the listeners a moment to bind.
    tokio::time::sleep(Duration::from_millis(200)).await;
}

fn client(auth_port: u16, acct_port: u16, coa_port: u16) -> Client {
    let dictionary = Dictionary::from_file(DICTIONARY_PATH).unwrap();
    Client::with_dictionary(dictionary)
        .set_server("127.0.0.1".to_string())
        .set_secret(SECRET.to_string())
        .set_port(RadiusMsgType::Auth, auth_port)
        .set_port(RadiusMsgType::Acct, acct_port)
        .set_port(RadiusMsgType::CoA, coa_port)
        .set_retries(3)
        .set_timeout(Duration::from_secs(2))
}

fn password_request(client: &Client, username: &str, password: &str) -> RadiusPacket {
    let mut request = client.create_auth_packet();
    let authenticator: [u8; 16] = request.authenticator().try_into().unwrap();
    request.set_attributes(vec![
        client
            .create_attribute_by_name("User-Name", username.as_bytes().to_vec())
            .unwrap(),
        client
            .create_attribute_by_name(
                "User-Password",
                encrypt_user_password(password.as_bytes(), SECRET.as_bytes(), &authenticator),
            )
            .unwrap(),
    ]);
    request
}

#[tokio::test]
async fn pap_accept_and_reject() {
    spawn_server(42812, 42813, 43799).await;
    let client = client(42812, 42813, 43799);

    let mut request = password_request(&client, "testing", "password");
    let reply = client.send_and_receive_packet(&mut request).await.unwrap();
    client.verify_reply(&request, &reply).unwrap();
    client.verify_packet_attributes(&reply).unwrap();

    let parsed = client.parse_packet(&reply).unwrap();
    assert_eq!(parsed.code(), TypeCode::AccessAccept);
    assert_eq!(parsed.attribute_by_name("Reply-Message").unwrap().value(), b"welcome");

    let mut request = password_request(&client, "testing", "not-the-password");
    let reply = client.send_and_receive_packet(&mut request).await.unwrap();
    client.verify_reply(&request, &reply).unwrap();
    assert_eq!(client.parse_packet(&reply).unwrap().code(), TypeCode::AccessReject);
}

#[tokio::test]
async fn accounting_round_trip() {
    spawn_server(42912, 42913, 43899).await;
    let client = client(42912, 42913, 43899);

    let mut request = client.create_acct_packet();
    request.set_attributes(vec![
        client
            .create_attribute_by_name("Acct-Status-Type", integer_to_bytes(1))
            .unwrap(),
        client
            .create_attribute_by_name("Acct-Session-Id", b"session-1".to_vec())
            .unwrap(),
        client
            .create_attribute_by_name("NAS-Identifier", b"trillian".to_vec())
            .unwrap(),
    ]);

    let reply = client.send_and_receive_packet(&mut request).await.unwrap();
    client.verify_reply(&request, &reply).unwrap();
    assert_eq!(client.parse_packet(&reply).unwrap().code(), TypeCode::AccountingResponse);
}

#[tokio::test]
async fn coa_ack_and_nak() {
    spawn_server(43012, 43013, 43199).await;
    let client = client(43012, 43013, 43199);

    let mut request = client.create_coa_packet();
    request.set_attributes(vec![
        client.create_attribute_by_name("User-Name", b"testing".to_vec()).unwrap(),
    ]);
    let reply = client.send_and_receive_packet(&mut request).await.unwrap();
    client.verify_reply(&request, &reply).unwrap();
    assert_eq!(client.parse_packet(&reply).unwrap().code(), TypeCode::CoAACK);

    let mut request = client.create_coa_packet();
    let reply = client.send_and_receive_packet(&mut request).await.unwrap();
    assert_eq!(client.parse_packet(&reply).unwrap().code(), TypeCode::CoANAK);
}
