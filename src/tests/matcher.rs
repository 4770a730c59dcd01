use crate::link::Link;
use crate::matcher::Needle;
use crate::status::Error;
use crate::tests::mock::{MockSerial, MockTimer};

type LinkType = Link<MockSerial, MockTimer, 1_000_000, 64>;

fn link_with_input(input: &[u8]) -> LinkType {
    let mut serial = MockSerial::new();
    serial.add_input(input);

    Link::new(serial, MockTimer::ticking(), 1_000)
}

#[test]
fn test_needle_overlapping_prefix() {
    let mut needle = Needle::new(b"\r\n\r\nOK");

    for byte in b"\r\n\r\n\r\nO" {
        needle.feed(*byte);
        assert!(!needle.is_complete());
    }

    needle.feed(b'K');
    assert!(needle.is_complete());
}

#[test]
fn test_needle_repeated_character() {
    let mut needle = Needle::new(b"aab");

    for byte in b"aaa" {
        needle.feed(*byte);
    }
    needle.feed(b'b');

    assert!(needle.is_complete());
}

#[test]
fn test_needle_feed_result() {
    let mut needle = Needle::new(b"OK");

    assert!(!needle.feed(b'X'));
    assert!(needle.feed(b'O'));
    assert!(needle.feed(b'K'));
    assert!(needle.is_complete());
}

#[test]
fn test_find() {
    let mut link = link_with_input(b"garbage\r\nready\r\nX");
    let deadline = link.deadline(100);

    assert!(link.find(b"ready", deadline).unwrap());
    assert_eq!(b'\r', link.read(deadline).unwrap());
}

#[test]
fn test_find_timeout() {
    let mut link = link_with_input(b"garbage");
    let deadline = link.deadline(50);

    assert!(!link.find(b"ready", deadline).unwrap());
}

#[test]
fn test_read_until_terminated() {
    let mut link = link_with_input(b"hello\"rest");
    let deadline = link.deadline(100);

    let mut buffer = [0x0; 16];
    let copied = link.read_until(&mut buffer, b"\"", deadline).unwrap();

    assert!(copied.terminated);
    assert_eq!(b"hello", &buffer[..copied.length]);
    assert_eq!(b'r', link.read(deadline).unwrap());
}

#[test]
fn test_read_until_multi_byte_target() {
    let mut link = link_with_input(b"abc\r\nOK\r\n");
    let deadline = link.deadline(100);

    let mut buffer = [0x0; 16];
    let copied = link.read_until(&mut buffer, b"\r\nOK", deadline).unwrap();

    assert!(copied.terminated);
    assert_eq!(b"abc", &buffer[..copied.length]);
}

#[test]
fn test_read_until_buffer_full() {
    let mut link = link_with_input(b"abcdefgh\"");
    let deadline = link.deadline(100);

    let mut buffer = [0x0; 4];
    let copied = link.read_until(&mut buffer, b"\"", deadline).unwrap();

    assert!(!copied.terminated);
    assert_eq!(4, copied.length);
    assert_eq!(b"abcd", &buffer);
    assert_eq!(b'e', link.read(deadline).unwrap());
}

#[test]
fn test_read_until_timeout() {
    let mut link = link_with_input(b"abc");
    let deadline = link.deadline(50);

    let mut buffer = [0x0; 8];
    let copied = link.read_until(&mut buffer, b"\"", deadline).unwrap();

    assert!(!copied.terminated);
    assert_eq!(b"abc", &buffer[..copied.length]);
}

#[test]
fn test_read_until_any_first_target() {
    let mut link = link_with_input(b"abERROR\r\nOK");
    let deadline = link.deadline(100);

    let mut buffer = [0x0; 16];
    let copied = link.read_until_any(&mut buffer, &[b"\r\nOK", b"ERROR"], deadline).unwrap();

    assert!(copied.terminated);
    assert_eq!(1, copied.target);
    assert_eq!(b"ab", &buffer[..copied.length]);
    assert_eq!(b'\r', link.read(deadline).unwrap());
}

#[test]
fn test_read_until_never_exceeds_buffer() {
    const MAX_LENGTH: usize = 12;

    for length in 0..=MAX_LENGTH {
        for input_length in 0..=2 * MAX_LENGTH {
            let mut input = vec![b'a'; input_length];
            // Target in the middle of longer inputs
            if input_length >= 4 {
                input[input_length / 2] = b'"';
            }

            let mut link = link_with_input(&input);
            let deadline = link.deadline(5);

            let mut storage = [0xAA; MAX_LENGTH + 4];
            let copied = link.read_until(&mut storage[..length], b"\"", deadline).unwrap();

            assert!(copied.length <= length, "length {} input {}", length, input_length);
            assert!(storage[length..].iter().all(|byte| *byte == 0xAA));
            assert!(storage[..copied.length].iter().all(|byte| *byte == b'a'));
        }
    }
}

#[test]
fn test_find_strings_first_complete_match() {
    let mut link = link_with_input(b"xxno change\r\nOK\r\n");
    let deadline = link.deadline(100);

    assert_eq!(2, link.find_strings(&[b"OK", b"ERROR", b"no change"], false, deadline).unwrap());
}

#[test]
fn test_find_strings_skips_frames() {
    let mut link = link_with_input(b"\r\n+IPD,2,5:ERROR\r\nOK\r\n");
    let deadline = link.deadline(100);

    assert_eq!(0, link.find_strings(&[b"OK", b"ERROR"], false, deadline).unwrap());
    assert_eq!(5, link.inbound.available(2));
}

#[test]
fn test_find_strings_strict_mismatch() {
    let mut link = link_with_input(b"OX");
    let deadline = link.deadline(100);

    assert_eq!(Error::Invalid, link.find_strings(&[b"OK"], true, deadline).unwrap_err());
}

#[test]
fn test_find_strings_timeout() {
    let mut link = link_with_input(b"O");
    let deadline = link.deadline(50);

    assert_eq!(Error::Timeout, link.find_strings(&[b"OK"], false, deadline).unwrap_err());
}

#[test]
fn test_find_strings_too_many_candidates() {
    let mut link = link_with_input(b"OK");
    let deadline = link.deadline(100);
    let candidates: [&[u8]; 9] = [b"A", b"B", b"C", b"D", b"E", b"F", b"G", b"H", b"OK"];

    assert_eq!(Error::Invalid, link.find_strings(&candidates, false, deadline).unwrap_err());
}

#[test]
fn test_expect() {
    let mut link = link_with_input(b",\"x");
    let deadline = link.deadline(100);

    link.expect(b",\"", deadline).unwrap();
    assert_eq!(Error::Invalid, link.expect(b",", deadline).unwrap_err());
}
