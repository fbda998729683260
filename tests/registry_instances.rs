use ribwire::{
    DetailClass, ElementType, ExportConfig, Exporter, ObjectIdentity, ParameterSlot,
    SceneInput, Snapshot, Topology,
};

#[test]
fn instance_records_share_a_bucket_chain() {
    let scene = SceneInput::from_json_str(
        r#"{
            "objects": [
                { "path": "|geo|leaf",
                  "samples": [ { "topology": { "Particles": { "count": 3 } },
                                 "params": { "slots": [] } } ] },
                { "path": "|geo|leaf", "instance": "1",
                  "samples": [ { "topology": { "Particles": { "count": 3 } },
                                 "params": { "slots": [] } } ] },
                { "path": "|geo|leaf", "instance": "2",
                  "samples": [ { "topology": { "Particles": { "count": 3 } },
                                 "params": { "slots": [] } } ] }
            ]
        }"#,
    )
    .unwrap();

    let mut exporter = Exporter::new(ExportConfig::default()).unwrap();
    let handles = exporter.ingest(&scene).unwrap();
    assert_eq!(handles.len(), 3);

    let registry = exporter.registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.chain_for_path("|geo|leaf").count(), 3);

    // Each identity resolves to its own record.
    let base = registry.find(&ObjectIdentity::path("|geo|leaf")).unwrap();
    let one = registry
        .find(&ObjectIdentity::instance("|geo|leaf", "1"))
        .unwrap();
    let two = registry
        .find(&ObjectIdentity::instance("|geo|leaf", "2"))
        .unwrap();
    assert_ne!(base, one);
    assert_ne!(one, two);
}

#[test]
fn instances_keep_independent_parameter_sets() {
    let mut exporter = Exporter::new(ExportConfig::default()).unwrap();

    let light_with_shader = |shader: &str| {
        let mut snap = Snapshot::new(Topology::Light);
        let mut slot = ParameterSlot::with_count(
            "shadername",
            ElementType::String,
            DetailClass::Constant,
            1,
        )
        .unwrap();
        slot.set_string(shader).unwrap();
        snap.params.append(slot);
        snap
    };
    let shaded = light_with_shader("spotlight");
    let recolored = light_with_shader("pointlight");

    exporter
        .record_sample(ObjectIdentity::path("|lights|rig"), 0, shaded)
        .unwrap();
    exporter
        .record_sample(ObjectIdentity::instance("|lights|rig", "1"), 0, recolored)
        .unwrap();

    let registry = exporter.registry();
    let base = registry.find(&ObjectIdentity::path("|lights|rig")).unwrap();
    let inst = registry
        .find(&ObjectIdentity::instance("|lights|rig", "1"))
        .unwrap();

    let base_shader = registry.record(base).unwrap().sample(0).unwrap();
    let inst_shader = registry.record(inst).unwrap().sample(0).unwrap();
    assert_eq!(
        base_shader.params.get("shadername").unwrap().text(),
        Some("spotlight")
    );
    assert_eq!(
        inst_shader.params.get("shadername").unwrap().text(),
        Some("pointlight")
    );
}
