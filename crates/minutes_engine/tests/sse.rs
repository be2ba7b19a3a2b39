use minutes_engine::{ApiError, FrameReader, StageFrame};
use pretty_assertions::assert_eq;

fn frame(stage: &str, message: &str) -> StageFrame {
    StageFrame {
        stage: stage.to_string(),
        message: message.to_string(),
        icon: None,
        redirect: None,
    }
}

#[test]
fn complete_block_yields_one_frame() {
    let mut reader = FrameReader::new();
    let frames = reader
        .push(b"data: {\"step\": \"upload\", \"message\": \"Uploading...\"}\n\n")
        .unwrap();

    assert_eq!(frames, vec![frame("upload", "Uploading...")]);
}

#[test]
fn block_split_across_chunks_yields_exactly_one_frame() {
    let mut reader = FrameReader::new();

    let frames = reader.push(b"data: {\"step\": \"stt\", \"mess").unwrap();
    assert!(frames.is_empty());

    let frames = reader.push(b"age\": \"Transcribing...\"}\n\n").unwrap();
    assert_eq!(frames, vec![frame("stt", "Transcribing...")]);
}

#[test]
fn multiple_blocks_in_one_chunk_yield_all_frames_in_order() {
    let mut reader = FrameReader::new();
    let chunk = concat!(
        "data: {\"step\": \"upload\", \"message\": \"a\"}\n\n",
        "data: {\"step\": \"stt\", \"message\": \"b\"}\n\n",
        "data: {\"step\": \"summary\", \"message\": \"c\"}\n\n",
    );

    let frames = reader.push(chunk.as_bytes()).unwrap();
    assert_eq!(
        frames,
        vec![frame("upload", "a"), frame("stt", "b"), frame("summary", "c")]
    );
}

#[test]
fn blocks_without_a_data_line_are_skipped() {
    let mut reader = FrameReader::new();
    let chunk = concat!(
        ": keep-alive\n\n",
        "data: {\"step\": \"mindmap\", \"message\": \"Drawing...\"}\n\n",
    );

    let frames = reader.push(chunk.as_bytes()).unwrap();
    assert_eq!(frames, vec![frame("mindmap", "Drawing...")]);
}

#[test]
fn malformed_json_aborts_the_stream() {
    let mut reader = FrameReader::new();
    let err = reader.push(b"data: {\"step\": \n\n").unwrap_err();

    assert!(matches!(err, ApiError::Protocol(_)), "got {err:?}");
}

#[test]
fn multibyte_utf8_split_across_chunks_decodes_cleanly() {
    // The icon is a 4-byte emoji; split it down the middle.
    let block = "data: {\"step\": \"upload\", \"message\": \"x\", \"icon\": \"\u{1f4e4}\"}\n\n";
    let bytes = block.as_bytes();
    let split = bytes.len() - 6;

    let mut reader = FrameReader::new();
    assert!(reader.push(&bytes[..split]).unwrap().is_empty());
    let frames = reader.push(&bytes[split..]).unwrap();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].icon.as_deref(), Some("\u{1f4e4}"));
}

#[test]
fn trailing_fragment_is_retained_for_the_next_chunk() {
    let mut reader = FrameReader::new();
    let chunk = concat!(
        "data: {\"step\": \"upload\", \"message\": \"a\"}\n\n",
        "data: {\"step\": \"stt\"",
    );

    let frames = reader.push(chunk.as_bytes()).unwrap();
    assert_eq!(frames, vec![frame("upload", "a")]);

    let frames = reader.push(b", \"message\": \"b\"}\n\n").unwrap();
    assert_eq!(frames, vec![frame("stt", "b")]);
}

#[test]
fn optional_fields_default_when_absent() {
    let mut reader = FrameReader::new();
    let frames = reader.push(b"data: {\"step\": \"complete\"}\n\n").unwrap();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].stage, "complete");
    assert_eq!(frames[0].message, "");
    assert_eq!(frames[0].icon, None);
    assert_eq!(frames[0].redirect, None);
}

#[test]
fn redirect_field_survives_decoding() {
    let mut reader = FrameReader::new();
    let frames = reader
        .push(b"data: {\"step\": \"complete\", \"message\": \"Done\", \"redirect\": \"/view/3\"}\n\n")
        .unwrap();

    assert_eq!(frames[0].redirect.as_deref(), Some("/view/3"));
}
