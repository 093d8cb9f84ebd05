use ndarray::{arr1, arr2};
use sgld_optim::*;

#[test]
fn test_no_anchor_without_localization_or_box() {
    let mut params = ParameterSet::new();
    let w = params.add(arr1(&[1.0f32, 2.0]).into_dyn());
    let sgld = Sgld::with_seed(
        &params,
        vec![ParamGroup::from_config(vec![w], SgldConfig::default())],
        [0u8; 32],
        false,
    )
    .unwrap();

    assert!(sgld.anchors().is_empty());
    assert!(sgld.anchor(w).is_none());
}

#[test]
fn test_anchors_only_for_groups_that_need_them() {
    let mut params = ParameterSet::new();
    let free = params.add(arr1(&[1.0f32]).into_dyn());
    let localized = params.add(arr1(&[2.0f32]).into_dyn());
    let boxed = params.add(arr1(&[3.0f32]).into_dyn());
    let groups = vec![
        ParamGroup::from_config(vec![free], SgldConfig::default()),
        ParamGroup::from_config(
            vec![localized],
            SgldConfig {
                localization: 100.0,
                ..Default::default()
            },
        ),
        ParamGroup::from_config(
            vec![boxed],
            SgldConfig {
                bounding_box_size: Some(0.1),
                ..Default::default()
            },
        ),
    ];
    let sgld = Sgld::with_seed(&params, groups, [0u8; 32], false).unwrap();

    assert_eq!(sgld.anchors().len(), 2);
    assert!(!sgld.anchors().contains(free));
    assert!(sgld.anchors().contains(localized));
    assert!(sgld.anchors().contains(boxed));
}

#[test]
fn test_anchor_is_never_mutated() {
    let mut params = ParameterSet::new();
    let w = params.add(arr2(&[[0.5f32, -0.5], [1.5, 2.5]]).into_dyn());
    let snapshot = params.value(w).unwrap().clone();
    let config = SgldConfig {
        lr: 0.05,
        localization: 3.0,
        weight_decay: 0.01,
        temperature: 30.0,
        bounding_box_size: Some(2.0),
        ..Default::default()
    };
    let mut sgld = Sgld::with_seed(
        &params,
        vec![ParamGroup::from_config(vec![w], config)],
        [42u8; 32],
        true,
    )
    .unwrap();

    for _ in 0..50 {
        params
            .set_grad(w, arr2(&[[1.0f32, -1.0], [0.5, 0.25]]).into_dyn())
            .unwrap();
        sgld.step(&mut params).unwrap();
    }

    assert_ne!(params.value(w).unwrap(), &snapshot);
    assert_eq!(sgld.anchor(w).unwrap(), &snapshot);
}

#[test]
fn test_host_edits_do_not_reach_anchor() {
    let mut params = ParameterSet::new();
    let w = params.add(arr1(&[1.0f32, 1.0]).into_dyn());
    let sgld = Sgld::with_seed(
        &params,
        vec![ParamGroup::from_config(
            vec![w],
            SgldConfig {
                localization: 1.0,
                ..Default::default()
            },
        )],
        [0u8; 32],
        false,
    )
    .unwrap();

    params.get_mut(w).unwrap().value.fill(-9.0);
    assert_eq!(sgld.anchor(w).unwrap(), &arr1(&[1.0f32, 1.0]).into_dyn());
}

#[test]
fn test_anchor_store_capture_once() {
    let mut store = AnchorStore::new();
    let id = ParamId(4);
    store.capture(id, &arr1(&[1.0f32, 2.0]).into_dyn());
    store.capture(id, &arr1(&[7.0f32, 8.0]).into_dyn());

    assert_eq!(store.len(), 1);
    assert_eq!(store.anchor(id).unwrap(), &arr1(&[1.0f32, 2.0]).into_dyn());
    assert!(store.anchor(ParamId(5)).is_none());
}
