use crate::registry::{Connection, Protocol, Registry, Role, MAX_LINKS};
use crate::status::Error;
use embedded_nal::{Ipv4Addr, SocketAddrV4};

fn connection(link_id: usize) -> Connection {
    Connection {
        link_id,
        protocol: Protocol::Tcp,
        remote: SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 80),
        role: Role::Client,
    }
}

#[test]
fn test_single_link_mode() {
    let registry = Registry::new();

    assert!(!registry.is_multiplexing());
    assert_eq!(1, registry.capacity());
    assert_eq!(Ok(()), registry.check(0));
    assert_eq!(Err(Error::NoLink), registry.check(1));
    assert_eq!(Some(0), registry.next_free());
}

#[test]
fn test_single_link_mode_occupied() {
    let mut registry = Registry::new();
    registry.insert(connection(0));

    assert_eq!(None, registry.next_free());
}

#[test]
fn test_multiplexing_mode() {
    let mut registry = Registry::new();
    registry.set_multiplexing(true);

    assert_eq!(MAX_LINKS, registry.capacity());
    assert_eq!(Ok(()), registry.check(4));
    assert_eq!(Err(Error::NoLink), registry.check(5));

    registry.insert(connection(0));
    registry.insert(connection(1));
    assert_eq!(Some(2), registry.next_free());

    assert_eq!(Some(connection(1)), registry.remove(1));
    assert_eq!(None, registry.remove(1));
    assert_eq!(Some(1), registry.next_free());
}

#[test]
fn test_all_links_occupied() {
    let mut registry = Registry::new();
    registry.set_multiplexing(true);
    (0..MAX_LINKS).for_each(|link_id| registry.insert(connection(link_id)));

    assert_eq!(None, registry.next_free());
    assert_eq!(MAX_LINKS, registry.iter().count());
}

#[test]
fn test_insert_invalid_link_ignored() {
    let mut registry = Registry::new();
    registry.insert(connection(7));

    assert_eq!(0, registry.iter().count());
    assert_eq!(None, registry.get(7));
    assert_eq!(None, registry.remove(7));
}

#[test]
fn test_replace() {
    let mut registry = Registry::new();
    registry.set_multiplexing(true);
    registry.insert(connection(0));
    registry.insert(connection(4));

    registry.replace(&[connection(2)]);

    assert_eq!(None, registry.get(0));
    assert_eq!(None, registry.get(4));
    assert_eq!(Some(&connection(2)), registry.get(2));
    assert!(registry.is_multiplexing());
}

#[test]
fn test_clear() {
    let mut registry = Registry::new();
    registry.insert(connection(0));
    registry.clear();

    assert_eq!(0, registry.iter().count());
}

#[test]
fn test_role_codes() {
    assert_eq!(Ok(Role::Client), Role::from_code(0));
    assert_eq!(Ok(Role::Server), Role::from_code(1));
    assert_eq!(Err(Error::Invalid), Role::from_code(2));
}

#[test]
fn test_protocol_literal() {
    assert_eq!("TCP", Protocol::Tcp.as_str());
    assert_eq!("UDP", Protocol::Udp.as_str());
}
