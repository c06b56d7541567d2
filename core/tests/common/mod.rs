// Shared fixtures. Integration tests compile as separate crates, so helpers live in a
// submodule instead of becoming their own test target.
#![allow(dead_code)]

use std::collections::BTreeMap;

use kcap_core::prelude::*;

pub const CREATED_AT: u64 = 1_700_000_000_123_456_789;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn kernel_events() -> Vec<KernelEvent> {
    let mut metadata = BTreeMap::new();
    metadata.insert("provider".to_string(), "Microsoft-Windows-Kernel-File".to_string());
    metadata.insert("tags".to_string(), "io,create".to_string());

    vec![
        KernelEvent {
            seq: 1,
            pid: 4_100,
            tid: 4_104,
            cpu: 2,
            name: "CreateFile".into(),
            category: "file".into(),
            description: "Creates or opens a file".into(),
            host: "ws-042".into(),
            timestamp: CREATED_AT + 1_000,
            params: vec![
                Param::new("file_name", ParamValue::Str("C:\\Windows\\notepad.exe".into())),
                Param::new("file_object", ParamValue::U64(0xffff_c30f_2a1b_0010)),
                Param::new("irp", ParamValue::U32(0x1f)),
                Param::new("create_disposition", ParamValue::U8(1)),
                Param::new("share_access", ParamValue::U16(7)),
                Param::new("status", ParamValue::I32(-1_073_741_772)),
                Param::new("offset", ParamValue::I64(-4096)),
                Param::new("entropy", ParamValue::F64(7.25)),
                Param::new("is_dir", ParamValue::Bool(false)),
                Param::new("sid", ParamValue::Bytes(vec![1, 5, 0, 0, 0, 0, 0, 5, 18])),
            ],
            metadata,
        },
        KernelEvent {
            seq: 2,
            pid: 4_100,
            tid: 4_108,
            cpu: 0,
            name: "CloseFile".into(),
            category: "file".into(),
            timestamp: CREATED_AT + 2_000,
            ..KernelEvent::default()
        },
    ]
}

pub fn processes() -> Vec<ProcessSnapshot> {
    let mut envs = BTreeMap::new();
    envs.insert("PATH".to_string(), "C:\\Windows\\System32".to_string());
    envs.insert("USERNAME".to_string(), "svc".to_string());
    vec![ProcessSnapshot {
        pid: 4_100,
        ppid: 812,
        name: "notepad.exe".into(),
        cmdline: "notepad.exe C:\\notes.txt".into(),
        exe: "C:\\Windows\\notepad.exe".into(),
        cwd: "C:\\Users\\svc".into(),
        sid: "S-1-5-18".into(),
        session_id: 1,
        args: vec!["C:\\notes.txt".into()],
        envs,
    }]
}

pub fn handles() -> Vec<Handle> {
    vec![
        Handle {
            num: 4,
            object: 0xffff_8000_0000_1000,
            pid: 4_100,
            handle_type: "File".into(),
            name: "\\Device\\HarddiskVolume2\\notes.txt".into(),
        },
        Handle {
            num: 8,
            object: 0xffff_8000_0000_2000,
            pid: 4_100,
            handle_type: "Key".into(),
            name: "\\REGISTRY\\MACHINE\\SOFTWARE".into(),
        },
    ]
}

pub fn pe_metadata() -> Vec<PeMetadata> {
    let mut version_resources = BTreeMap::new();
    version_resources.insert("CompanyName".to_string(), "Microsoft Corporation".to_string());
    version_resources.insert("FileVersion".to_string(), "10.0.19041.1".to_string());
    vec![PeMetadata {
        pid: 4_100,
        nsections: 2,
        nsymbols: 0,
        image_base: 0x1_4000_0000,
        entry_point: 0x1_4000_1a20,
        sections: vec![
            PeSection { name: ".text".into(), size: 0x1_2000, entropy: 6.21, md5: "9e107d9d372bb6826bd81d3542a419d6".into() },
            PeSection { name: ".rdata".into(), size: 0x8000, entropy: 4.02, md5: "e4d909c290d0fb1ca068ffaddf22cbd0".into() },
        ],
        symbols: vec![],
        imports: vec!["KERNEL32.dll".into(), "USER32.dll".into()],
        version_resources,
    }]
}

/// One batch of every kind, in a fixed order.
pub fn mixed_batches() -> Vec<Records> {
    vec![
        Records::KernelEvents(kernel_events()),
        Records::Processes(processes()),
        Records::Handles(handles()),
        Records::PeMetadata(pe_metadata()),
        Records::KernelEvents(kernel_events()[1..].to_vec()),
    ]
}

pub fn options() -> WriterOptions {
    WriterOptions::default().with_created_at(CREATED_AT)
}

pub fn compressed_options(codec: CompressionCodec) -> WriterOptions {
    WriterOptions::compressed(codec).with_created_at(CREATED_AT)
}

/// Write `batches` into an in-memory capture and close it.
pub fn write_capture(batches: &[Records], opts: WriterOptions) -> (Vec<u8>, CaptureSummary) {
    let mut w = CaptureWriter::new(Vec::new(), VersionRegistry::shared(), opts).unwrap();
    for batch in batches {
        w.write_section(batch).unwrap();
    }
    w.close_into_inner().unwrap()
}

/// Decode every section of `bytes`, failing the test on any error.
pub fn read_all(bytes: &[u8], opts: ReaderOptions) -> Vec<Records> {
    let reader = CaptureReader::new(bytes, VersionRegistry::shared(), opts).unwrap();
    reader.map(|s| s.unwrap().records().unwrap()).collect()
}
