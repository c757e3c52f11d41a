use bytes::Bytes;
use num_bigint::BigInt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

use cachet::codec::{FrameCodec, Protocol};
use cachet::connection::Connection;
use cachet::frame::{self, Frame};

async fn create_tcp_connection() -> Result<(UnboundedSender<Vec<u8>>, TcpStream), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            while let Some(data) = rx.recv().await {
                // Write the received channel data to the socket.
                if socket.write_all(&data).await.is_err() {
                    break;
                }
            }
        }
    });

    // Connect to the server as a client to complete the setup.
    let stream = TcpStream::connect(local_addr).await?;

    Ok((tx, stream))
}

#[tokio::test]
async fn test_parse_simple_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"+OK\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Simple("OK".to_string()));

    assert_eq!(actual, expected);
    assert_eq!(connection.protocol(), Some(Protocol::Resp));
}

#[tokio::test]
async fn test_parse_bulk_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"$11\nhello\nworld\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Bulk(Bytes::from("hello\nworld")));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let bytes = b"*3\n$3\nSET\n$5\nmykey\n$7\nmyvalue\n";

    tcp_stream_tx.send(bytes.to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey")),
        Frame::Bulk(Bytes::from("myvalue")),
    ]));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_crlf_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let bytes = b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n";

    tcp_stream_tx.send(bytes.to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("GET")),
        Frame::Bulk(Bytes::from("mykey")),
    ]));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_typed_values() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let bytes = b"%2\n+a\n,1.5\n+b\n#t\n~2\n_\n(12345678901234567890\n!4\nnope\n";

    tcp_stream_tx.send(bytes.to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Map(vec![
        (Frame::Simple("a".to_string()), Frame::Double(1.5)),
        (Frame::Simple("b".to_string()), Frame::Boolean(true)),
    ]));
    assert_eq!(actual, expected);

    let actual = connection.read_frame().await.unwrap();
    let number: BigInt = "12345678901234567890".parse().unwrap();
    let expected = Some(Frame::Set(vec![Frame::Null, Frame::BigNumber(number)]));
    assert_eq!(actual, expected);

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::BulkError(Bytes::from("nope")));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_multiple_commands_sequentially() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let simple_string = b"+OK\n";
    let bulk_string = b"$5\nhello\n";
    let array = b"*3\n$3\nSET\n$7\nmykey_1\n$9\nmyvalue_1\n";
    let simple_error = b"-Error message\n";
    let integer = b":1000\n";

    tcp_stream_tx.send(simple_string.to_vec()).unwrap();
    tcp_stream_tx.send(bulk_string.to_vec()).unwrap();
    tcp_stream_tx.send(array.to_vec()).unwrap();
    tcp_stream_tx.send(simple_error.to_vec()).unwrap();
    tcp_stream_tx.send(integer.to_vec()).unwrap();

    // Simple string.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Simple("OK".to_string()));
    assert_eq!(actual, expected);

    // Bulk string.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Bulk(Bytes::from("hello")));
    assert_eq!(actual, expected);

    // Array.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey_1")),
        Frame::Bulk(Bytes::from("myvalue_1")),
    ]));
    assert_eq!(actual, expected);

    // Simple error.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Error(String::from("Error message")));
    assert_eq!(actual, expected);

    // Integer.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Integer(1000));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_incomplete_frame() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    // Command split into three parts to simulate partial/incomplete data sending.
    // "*3\n$3\nSET\n$5\nmykey\n$7\nmyvalue\n";
    let part1 = b"*3\n$3\nSE";
    let part2 = b"T\n$5\nmyke";
    let part3 = b"y\n$7\nmyvalue\n";

    tokio::spawn(async move {
        let parts = vec![part1.to_vec(), part2.to_vec(), part3.to_vec()];
        for part in parts {
            tcp_stream_tx.send(part).unwrap();
            // Simulate a delay in sending/receiving the data.
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey")),
        Frame::Bulk(Bytes::from("myvalue")),
    ]));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_inline_commands() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx
        .send(b"SET key \"hello world\"\n\nGET key".to_vec())
        .unwrap();
    drop(tcp_stream_tx);

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("key")),
        Frame::Bulk(Bytes::from("hello world")),
    ]));
    assert_eq!(actual, expected);
    assert_eq!(connection.protocol(), Some(Protocol::Inline));

    // The blank line is skipped and the unterminated last line still counts.
    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("GET")),
        Frame::Bulk(Bytes::from("key")),
    ]));
    assert_eq!(actual, expected);

    assert_eq!(connection.read_frame().await.unwrap(), None);
}

#[tokio::test]
async fn test_recovers_from_invalid_frame() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b":12a\n+OK\n".to_vec()).unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, frame::Error::InvalidInteger));
    assert!(err.is_recoverable());

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));
}

#[tokio::test]
async fn test_rejects_oversize_blob() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::with_codec(tcp_stream, FrameCodec::new(4));

    tcp_stream_tx.send(b"$10\n0123456789\n+OK\n".to_vec()).unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(
        err,
        frame::Error::BufferExceeded { length: 10, max: 4 }
    ));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));
}

#[tokio::test]
async fn test_invalid_element_discards_nested_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx
        .send(b"*2\n#z\n*3\n$3\nset\n$1\na\n$1\nb\n+OK\n".to_vec())
        .unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, frame::Error::InvalidBoolean));

    // The nested array belongs to the failed request, it is never handed out.
    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));
}

#[tokio::test]
async fn test_rejects_oversize_blob_inside_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::with_codec(tcp_stream, FrameCodec::new(4));

    tokio::spawn(async move {
        let parts: Vec<&[u8]> = vec![b"*3\n$3\nset\n$10\n012", b"3456789\n$1\nb\n+OK\n"];
        for part in parts {
            tcp_stream_tx.send(part.to_vec()).unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    });

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(
        err,
        frame::Error::BufferExceeded { length: 10, max: 4 }
    ));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));
}

#[tokio::test]
async fn test_truncated_frame_at_eof() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"*2\n$3\nGET\n".to_vec()).unwrap();
    drop(tcp_stream_tx);

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, frame::Error::Truncated));

    assert_eq!(connection.read_frame().await.unwrap(), None);
}

#[tokio::test]
async fn test_write_frame_mirrors_line_ending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut client = TcpStream::connect(listener.local_addr().unwrap())
        .await
        .unwrap();
    let (socket, _) = listener.accept().await.unwrap();
    let mut connection = Connection::new(socket);

    client.write_all(b"*1\r\n$4\r\nPING\r\n").await.unwrap();
    connection.read_frame().await.unwrap();

    connection
        .write_frame(&Frame::Array(vec![
            Frame::Simple("PONG".to_string()),
            Frame::Integer(1),
        ]))
        .await
        .unwrap();

    let expected = b"*2\r\n+PONG\r\n:1\r\n";
    let mut actual = vec![0; expected.len()];
    client.read_exact(&mut actual).await.unwrap();

    assert_eq!(actual, expected);
}
