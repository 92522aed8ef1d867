//! Table to configuration, end to end, without a device.

use std::io::Write;

use netdeploy::assemble::{SwitchAssembler, Trailer};
use netdeploy::config::{RouterSettings, SwitchSettings};
use netdeploy::source::SwitchRow;
use netdeploy::{ErrorKind, FailurePolicy};

const SWITCH_TABLE: &str = "\
Vlan;Description;IP Address;Netmask;Switch;Ports
10;Data;;;1;1-3
20;Mgmt;192.168.1.10;255.255.255.0;1;
";

fn write_table(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_switch_table_whole_file() {
    let file = write_table(SWITCH_TABLE);
    let rows = SwitchRow::read(file.path(), b';').unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line, 2);

    let assembler = SwitchAssembler::from_settings(&SwitchSettings::default());
    let config = assembler.assemble_all(&rows).unwrap();

    let mut expected = vec![
        "vlan 10".to_string(),
        "name Data".to_string(),
        "interface vlan 10".to_string(),
        "no shutdown".to_string(),
    ];
    for port in 1..=3 {
        expected.push(format!("interface FastEthernet0/{port}"));
        expected.push("switchport mode access".to_string());
        expected.push("switchport access vlan 10".to_string());
        expected.push("no shutdown".to_string());
    }
    expected.extend(
        [
            "vlan 20",
            "name Mgmt",
            "interface vlan 20",
            "ip address 192.168.1.10 255.255.255.0",
            "no shutdown",
            "access-list 1 permit any",
            "ip nat inside source list 1 interface gi0/0 overload",
        ]
        .map(String::from),
    );
    assert_eq!(config.as_slice(), expected.as_slice());

    // Same table, same output.
    assert_eq!(assembler.assemble_all(&rows).unwrap(), config);

    let other_egress = assembler
        .with_trailer(Some(Trailer::new("Dialer0")))
        .assemble_all(&rows)
        .unwrap();
    assert_eq!(
        other_egress.iter().last(),
        Some("ip nat inside source list 1 interface Dialer0 overload")
    );
}

#[test]
fn test_trailer_disabled_by_empty_egress() {
    let file = write_table(SWITCH_TABLE);
    let rows = SwitchRow::read(file.path(), b';').unwrap();
    let settings = SwitchSettings {
        nat_egress_interface: Some(String::new()),
        ..Default::default()
    };

    let config = SwitchAssembler::from_settings(&settings)
        .assemble_all(&rows)
        .unwrap();
    assert_eq!(config.iter().last(), Some("no shutdown"));
    assert_eq!(config.count("access-list 1 permit any"), 0);
}

#[test]
fn test_switch_table_per_device() {
    let file = write_table(SWITCH_TABLE);
    let rows = SwitchRow::read(file.path(), b';').unwrap();

    let lists = SwitchAssembler::default().assemble_per_device(&rows);
    assert_eq!(lists.len(), 2);
    let unrouted = SwitchAssembler::default()
        .with_ip_routing(false)
        .assemble_per_device(&rows);
    assert!(unrouted.iter().all(|l| l.as_ref().unwrap().count("ip routing") == 0));
    for list in &lists {
        let list = list.as_ref().unwrap();
        assert_eq!(list.iter().last(), Some("ip routing"));
        assert_eq!(list.count("ip routing"), 1);
        assert_eq!(list.count("access-list 1 permit any"), 0);
    }
}

#[test]
fn test_bad_row_stays_attached_to_its_row() {
    let file = write_table(
        "Vlan;Description;IP Address;Netmask;Switch;Ports\n\
         10;Data;;;1;1-3\n\
         10;Data;;;2;30-1\n",
    );
    let rows = SwitchRow::read(file.path(), b';').unwrap();
    let lists = SwitchAssembler::default().assemble_per_device(&rows);

    assert!(lists[0].is_ok());
    let err = lists[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPortRange);
}

#[test]
fn test_missing_column_is_a_parse_error() {
    let file = write_table("Vlan;Description;Switch\n10;Data;1\n");
    let err = SwitchRow::read(file.path(), b';').unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn test_router_file_generation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("router.csv");
    let output = dir.path().join("router.txt");
    std::fs::write(
        &input,
        "network,interface,description,vlan,ipaddress,subnetmask,defaultgateway\n\
         wan,Gi0/0,Uplink,,dhcp,,\n\
         lan,Gi0/1.10,Staff,10,192.168.10.1,255.255.255.0,\n",
    )
    .unwrap();

    let settings = RouterSettings {
        input,
        delimiter: ',',
        output: output.clone(),
        egress_interface: "Gi0/0".to_string(),
    };
    let generated =
        netdeploy::deploy::generate_router_config(&settings, &FailurePolicy::ContinueAll).unwrap();
    assert_eq!(generated.report.succeeded(), 2);

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), generated.commands.len());
    assert!(written.contains("interface Gi0/1.10\n description Staff\n encapsulation dot1Q 10"));
    assert!(written.contains("interface Gi0/0\n ip nat outside"));
    assert!(written.contains("interface Gi0/1.10\n ip nat inside"));
    assert!(written.ends_with("ip nat inside source list 1 interface Gi0/0 overload"));
}
