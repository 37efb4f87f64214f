//! Sends a PAP Access-Request with a Message-Authenticator to a local
//! RADIUS server and prints the verdict.
//!
//! Run a server first (for example `radius-server` from this workspace with
//! its generated example configuration), then:
//!
//! ```text
//! cargo run --example access_request -- path/to/dictionary
//! ```

use radius_client::Client;
use radius_core::auth::encrypt_user_password;
use radius_core::dictionary::Dictionary;
use radius_core::packet::{RadiusMsgType, TypeCode, MESSAGE_AUTHENTICATOR};
use radius_core::scalar::{integer_to_bytes, ipv4_string_to_bytes};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let dictionary_path = std::env::args().nth(1).unwrap_or_else(|| "dictionary".to_string());
    let dictionary = Dictionary::from_file(&dictionary_path)?;

    let client = Client::with_dictionary(dictionary)
        .set_server("127.0.0.1".to_string())
        .set_secret("secret".to_string())
        .set_port(RadiusMsgType::Auth, 1812)
        .set_retries(3)
        .set_timeout(Duration::from_secs(2));

    let mut request = client.create_auth_packet();
    let authenticator: [u8; 16] = request.authenticator().try_into()?;

    request.set_attributes(vec![
        client.create_attribute_by_name("User-Name", b"testing".to_vec())?,
        client.create_attribute_by_name(
            "User-Password",
            encrypt_user_password(b"password", client.secret().as_bytes(), &authenticator),
        )?,
        client.create_attribute_by_name("NAS-IP-Address", ipv4_string_to_bytes("192.168.1.10")?)?,
        client.create_attribute_by_name("NAS-Port-Id", integer_to_bytes(0))?,
        client.create_attribute_by_name(MESSAGE_AUTHENTICATOR, vec![0u8; 16])?,
    ]);
    request.generate_message_authenticator(client.secret().as_bytes())?;

    let reply = client.send_and_receive_packet(&mut request).await?;
    client.verify_reply(&request, &reply)?;

    let parsed = client.parse_packet(&reply)?;
    match parsed.code() {
        TypeCode::AccessAccept => println!("accepted"),
        TypeCode::AccessReject => println!("rejected"),
        other => println!("unexpected reply: {other:?}"),
    }

    if let Some(message) = parsed.attribute_by_name("Reply-Message") {
        println!("server says: {}", String::from_utf8_lossy(message.value()));
    }
    Ok(())
}
