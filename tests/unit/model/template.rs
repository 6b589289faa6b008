use super::*;

const TEMPLATE: &str = r##"{
  "id": 7,
  "templateName": "Senior High 2024",
  "templateType": "student",
  "schoolLevel": "senior_high",
  "isActive": true,
  "canvas": { "width": 591, "height": 1004, "backgroundColor": "#f0f0f0" },
  "front": {
    "backgroundImage": "/api/templates/backgrounds/front/blue.png",
    "layers": [
      { "id": "name", "type": "text", "x": 20, "y": 400, "width": 551, "height": 40,
        "field": "full_name", "fontSize": 28, "fontWeight": "bold", "textAlign": "center",
        "uppercase": true, "zIndex": 3 },
      { "id": "photo", "type": "image", "x": 170, "y": 120, "width": 250, "height": 250,
        "field": "photo", "borderRadius": 125, "zIndex": 2 },
      { "id": "band", "type": "shape", "x": 0, "y": 0, "width": 591, "height": 80,
        "shape": "rectangle", "fill": "rgba(0, 51, 153, 1)", "stroke": "" },
      { "id": "qr", "type": "qr_code", "x": 400, "y": 820, "width": 150, "height": 150 },
      { "id": "sig", "type": "signature", "x": 0, "y": 0, "width": 10, "height": 10, "zIndex": 9 }
    ]
  }
}"##;

#[test]
fn parses_full_template() {
    let t = Template::from_json_str(TEMPLATE).unwrap();
    assert_eq!(t.id, "7");
    assert_eq!(t.name, "Senior High 2024");
    assert_eq!(t.entity_type, EntityType::Student);
    assert_eq!(t.school_level, SchoolLevel::SeniorHigh);
    assert!(t.active);
    assert_eq!(t.canvas.background_color, Color::rgb(0xf0, 0xf0, 0xf0));
    assert_eq!(t.front.layers.len(), 5);
    assert!(t.back.layers.is_empty());
    assert!(t.back.background_image.is_none());
}

#[test]
fn layer_defaults_are_applied() {
    let t = Template::from_json_str(TEMPLATE).unwrap();

    let LayerSlot::Known(Layer::Text(text)) = &t.front.layers[0] else {
        panic!("expected text layer");
    };
    assert_eq!(text.font_family, "Arial");
    assert_eq!(text.font_weight, FontWeight::BOLD);
    assert!(text.font_weight.is_bold());
    assert!((text.line_height - 1.2).abs() < 1e-6);
    assert_eq!(text.common.opacity, 1.0);
    assert!(text.common.visible);

    let LayerSlot::Known(Layer::Shape(shape)) = &t.front.layers[2] else {
        panic!("expected shape layer");
    };
    assert_eq!(shape.common.z_index, 1);
    assert_eq!(shape.fill, Some(Color::rgb(0, 51, 153)));
    assert_eq!(shape.stroke, None);
    assert_eq!(shape.stroke_width, 1.0);

    let LayerSlot::Known(Layer::QrCode(qr)) = &t.front.layers[3] else {
        panic!("expected qr layer");
    };
    assert_eq!(qr.field, "id_number");
    assert_eq!(qr.error_correction_level, ErrorCorrection::M);
    assert_eq!(qr.background_color, Color::WHITE);
}

#[test]
fn unknown_type_is_kept_as_unsupported() {
    let t = Template::from_json_str(TEMPLATE).unwrap();
    let slot = &t.front.layers[4];
    assert!(matches!(slot, LayerSlot::Unsupported { .. }));
    assert_eq!(slot.id(), "sig");
    assert_eq!(slot.type_tag(), "signature");
    assert_eq!(slot.z_index(), 9);
}

#[test]
fn paint_order_is_stable_by_z_index() {
    let t = Template::from_json_str(TEMPLATE).unwrap();
    let ids = t
        .front
        .paint_order()
        .into_iter()
        .map(LayerSlot::id)
        .collect::<Vec<_>>();
    assert_eq!(ids, ["band", "qr", "photo", "name", "sig"]);
}

#[test]
fn hidden_layers_are_not_in_paint_order() {
    let json = r#"{"front":{"layers":[
        {"id":"a","type":"shape","x":0,"y":0,"width":1,"height":1,"visible":false},
        {"id":"b","type":"shape","x":0,"y":0,"width":1,"height":1}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    let ids = t
        .front
        .paint_order()
        .into_iter()
        .map(LayerSlot::id)
        .collect::<Vec<_>>();
    assert_eq!(ids, ["b"]);
}

#[test]
fn qrcode_alias_is_accepted() {
    let json = r#"{"front":{"layers":[
        {"id":"q","type":"qrcode","x":0,"y":0,"width":10,"height":10,"field":"lrn"}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    let LayerSlot::Known(Layer::QrCode(qr)) = &t.front.layers[0] else {
        panic!("expected qr layer");
    };
    assert_eq!(qr.field, "lrn");
}

#[test]
fn non_object_side_is_configuration_error() {
    let err = Template::from_json_str(r#"{"front": 3}"#).unwrap_err();
    assert!(matches!(err, CardError::Configuration(_)), "{err}");
}

#[test]
fn known_layer_with_bad_property_is_kept_as_invalid() {
    let json = r#"{"front":{"layers":[
        {"id":"t","type":"text","x":0,"y":0,"width":10,"height":10,"fontSize":"16","zIndex":4},
        {"id":"s","type":"shape","x":0,"y":0,"width":10,"height":10,"fill":"red"}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    let LayerSlot::Invalid { error, .. } = &t.front.layers[0] else {
        panic!("expected invalid slot, got {:?}", t.front.layers[0]);
    };
    assert!(error.contains("invalid type"), "{error}");
    assert_eq!(t.front.layers[0].id(), "t");
    assert_eq!(t.front.layers[0].type_tag(), "text");
    assert_eq!(t.front.layers[0].z_index(), 4);
    assert!(matches!(t.front.layers[1], LayerSlot::Known(Layer::Shape(_))));
}

#[test]
fn unparsable_color_invalidates_only_its_layer() {
    let json = r#"{"front":{"layers":[
        {"id":"t","type":"text","x":0,"y":0,"width":10,"height":10,"color":"not-a-color"}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    assert!(matches!(t.front.layers[0], LayerSlot::Invalid { .. }));
}

#[test]
fn missing_geometry_takes_per_kind_defaults() {
    let json = r#"{"front":{"layers":[
        {"id":"t","type":"text"},
        {"id":"i","type":"image","x":5},
        {"id":"s","type":"shape","width":30},
        {"id":"q","type":"qr_code","height":40}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    let boxes = t
        .front
        .layers
        .iter()
        .map(|slot| {
            let LayerSlot::Known(layer) = slot else {
                panic!("expected known layer, got {slot:?}");
            };
            let c = layer.common();
            (c.x, c.y, c.width, c.height)
        })
        .collect::<Vec<_>>();
    assert_eq!(
        boxes,
        [
            (0.0, 0.0, 200.0, 50.0),
            (5.0, 0.0, 200.0, 200.0),
            (0.0, 0.0, 30.0, 100.0),
            (0.0, 0.0, 100.0, 40.0),
        ]
    );
}

#[test]
fn zero_canvas_is_rejected() {
    let err = Template::from_json_str(r#"{"canvas":{"width":0,"height":10}}"#).unwrap_err();
    assert!(err.to_string().contains("canvas size"));
}

#[test]
fn zero_font_size_invalidates_the_layer() {
    let json = r#"{"back":{"layers":[
        {"id":"t","type":"text","x":0,"y":0,"width":10,"height":10,"fontSize":0}
    ]}}"#;
    let t = Template::from_json_str(json).unwrap();
    let LayerSlot::Invalid { error, .. } = &t.back.layers[0] else {
        panic!("expected invalid slot");
    };
    assert!(error.contains("fontSize"), "{error}");
}

#[test]
fn default_text_shadow_is_flat() {
    let shadow: TextShadow = serde_json::from_str("{}").unwrap();
    assert_eq!(shadow.blur, 0.0);
    assert_eq!(shadow.offset_y, 1.0);
}

#[test]
fn empty_object_gets_default_canvas() {
    let t = Template::from_json_str("{}").unwrap();
    assert_eq!((t.canvas.width, t.canvas.height), (591, 1004));
    assert_eq!(t.canvas.background_color, Color::WHITE);
}

#[test]
fn font_weight_accepts_numbers_and_names() {
    let w: FontWeight = serde_json::from_str("600").unwrap();
    assert!(w.is_bold());
    let w: FontWeight = serde_json::from_str(r#""500""#).unwrap();
    assert!(!w.is_bold());
    assert!(serde_json::from_str::<FontWeight>(r#""heavy""#).is_err());
}

#[test]
fn side_kind_parses_case_insensitively() {
    assert_eq!("Front".parse::<SideKind>().unwrap(), SideKind::Front);
    assert_eq!(SideKind::Back.to_string(), "back");
    assert!("both".parse::<SideKind>().is_err());
}
