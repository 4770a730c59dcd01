use crate::link::Link;
use crate::status::{CommandStatus, Completion, Error};
use crate::tests::mock::{MockSerial, MockTimer};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

type LinkType = Link<MockSerial, MockTimer, 1_000_000, 64>;

fn link_with_input(input: &[u8]) -> LinkType {
    let mut serial = MockSerial::new();
    serial.add_input(input);

    Link::new(serial, MockTimer::ticking(), 1_000)
}

fn read_status(input: &[u8]) -> CommandStatus {
    let mut link = link_with_input(input);
    let deadline = link.deadline(100);

    link.read_status(deadline)
}

#[test]
fn test_read_status_terminators() {
    assert_eq!(CommandStatus::Ok, read_status(b"\r\nOK\r\n"));
    assert_eq!(CommandStatus::Error, read_status(b"\r\nERROR\r\n"));
    assert_eq!(CommandStatus::NoChange, read_status(b"no change\r\n"));
    assert_eq!(CommandStatus::NoLink, read_status(b"link is not valid\r\n\r\nERROR\r\n"));
    assert_eq!(CommandStatus::Error, read_status(b"\r\nSEND FAIL\r\n"));
}

#[test]
fn test_read_status_skips_reply_values() {
    assert_eq!(CommandStatus::Ok, read_status(b"+CWMODE:1\r\n\r\nOK\r\n"));
}

#[test]
fn test_read_status_busy_waits_for_final_reply() {
    assert_eq!(CommandStatus::Ok, read_status(b"busy p...\r\n\r\nOK\r\n"));
    assert_eq!(CommandStatus::Timeout, read_status(b"busy p...\r\n"));
}

#[test]
fn test_read_status_timeout_bounded() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut link: LinkType = Link::new(MockSerial::new(), MockTimer::counting(calls.clone()), 1_000);
    let deadline = link.deadline(50);

    assert_eq!(CommandStatus::Timeout, link.read_status(deadline));
    assert!(calls.load(Ordering::SeqCst) <= 60);
}

#[test]
fn test_read_status_invalid_transport() {
    let mut link = link_with_input(b"OK");
    link.serial.fail_read();
    let deadline = link.deadline(100);

    assert_eq!(CommandStatus::Invalid, link.read_status(deadline));
}

#[test]
fn test_read_status_frame_between_replies() {
    let mut link = link_with_input(b"\r\nOK\r\n+IPD,2,5:hello\r\nERROR\r\n");
    let deadline = link.deadline(100);

    assert_eq!(CommandStatus::Ok, link.read_status(deadline));
    assert_eq!(CommandStatus::Error, link.read_status(deadline));

    let mut buffer = [0x0; 8];
    assert_eq!(5, link.inbound.drain_into(2, &mut buffer));
    assert_eq!(b"hello", &buffer[..5]);
}

#[test]
fn test_into_result() {
    assert_eq!(Ok(Completion::Ok), CommandStatus::Ok.into_result());
    assert_eq!(Ok(Completion::NoChange), CommandStatus::NoChange.into_result());
    assert_eq!(Err(Error::Rejected), CommandStatus::Error.into_result());
    assert_eq!(Err(Error::NoLink), CommandStatus::NoLink.into_result());
    assert_eq!(Err(Error::Timeout), CommandStatus::Timeout.into_result());
    assert_eq!(Err(Error::TooLong), CommandStatus::TooLong.into_result());
    assert_eq!(Err(Error::Invalid), CommandStatus::Invalid.into_result());
}

#[test]
fn test_conversion_back_to_status() {
    assert_eq!(CommandStatus::Error, CommandStatus::from(Error::Rejected));
    assert_eq!(CommandStatus::TooLong, CommandStatus::from(Error::TooLong));
    assert_eq!(CommandStatus::NoChange, CommandStatus::from(Completion::NoChange));

    assert!(CommandStatus::NoChange.is_success());
    assert!(!CommandStatus::Timeout.is_success());
}
