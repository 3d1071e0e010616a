//! Advanced SubStation Alpha (ASS) document generation.
//!
//! One document per scene: a single style and a single dialogue event
//! spanning the scene, with override tags encoding the reveal effect.

use std::fmt::Write as _;

use storyreel_job_model::style::RevealEffect;

use crate::caption_style::CaptionStyle;
use crate::caption_timing::{
    CaptionTrack, POP_GROW_MS, POP_PEAK_PERCENT, POP_SETTLE_MS,
};

const STYLE_NAME: &str = "Caption";

/// Escape caption text so it cannot open override blocks.
pub fn escape_ass_text(text: &str) -> String {
    text.replace('\\', r"\\")
        .replace('{', r"\{")
        .replace('}', r"\}")
        .replace(['\r', '\n'], " ")
}

/// Dialogue text with override tags for the track's effect.
pub fn event_text(track: &CaptionTrack) -> String {
    let mut out = String::new();
    match track.effect {
        RevealEffect::PerWord | RevealEffect::PerCharacter => {
            let separator = track.separator();
            for (i, unit) in track.units.iter().enumerate() {
                if i > 0 {
                    out.push_str(separator);
                }
                let _ = write!(out, "{{\\k{}}}{}", unit.centis, escape_ass_text(&unit.text));
            }
        }
        RevealEffect::SmoothFill => {
            let _ = write!(
                out,
                "{{\\kf{}}}{}",
                track.total_centis,
                escape_ass_text(&track.plain_text())
            );
        }
        RevealEffect::FadeIn => {
            let _ = write!(
                out,
                "{{\\fad({},0)}}{}",
                track.fade_in_ms(),
                escape_ass_text(&track.plain_text())
            );
        }
        RevealEffect::Pop => {
            let _ = write!(
                out,
                "{{\\fscx0\\fscy0\\t(0,{grow},\\fscx{peak}\\fscy{peak})\\t({grow},{settle},\\fscx100\\fscy100)}}{}",
                escape_ass_text(&track.plain_text()),
                grow = POP_GROW_MS,
                settle = POP_SETTLE_MS,
                peak = POP_PEAK_PERCENT,
            );
        }
        RevealEffect::Static => out.push_str(&escape_ass_text(&track.plain_text())),
    }
    out
}

/// Render a complete ASS document for one scene.
pub fn render_document(track: &CaptionTrack, style: &CaptionStyle, width: u32, height: u32) -> String {
    let mut doc = String::with_capacity(1024);

    let _ = writeln!(doc, "[Script Info]");
    let _ = writeln!(doc, "ScriptType: v4.00+");
    let _ = writeln!(doc, "PlayResX: {width}");
    let _ = writeln!(doc, "PlayResY: {height}");
    let _ = writeln!(doc, "WrapStyle: 0");
    let _ = writeln!(doc, "ScaledBorderAndShadow: yes");
    let _ = writeln!(doc);

    let _ = writeln!(doc, "[V4+ Styles]");
    let _ = writeln!(
        doc,
        "Format: Name,Fontname,Fontsize,PrimaryColour,SecondaryColour,OutlineColour,BackColour,Bold,Italic,Underline,StrikeOut,ScaleX,ScaleY,Spacing,Angle,BorderStyle,Outline,Shadow,Alignment,MarginL,MarginR,MarginV,Encoding"
    );
    let _ = writeln!(
        doc,
        "Style: {STYLE_NAME},{font},{size},{pri},{sec},{out},{back},-1,0,0,0,100,100,0,0,1,{ow},{sh},{al},{mh},{mh},{mv},1",
        font = style.font_name,
        size = style.font_size,
        pri = style.primary_colour(),
        sec = style.secondary_colour(),
        out = style.outline_colour(),
        back = style.back_colour(),
        ow = style.outline_width,
        sh = style.shadow_depth,
        al = style.alignment,
        mh = style.margin_h,
        mv = style.margin_v,
    );
    let _ = writeln!(doc);

    let _ = writeln!(doc, "[Events]");
    let _ = writeln!(doc, "Format: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text");
    let _ = writeln!(
        doc,
        "Dialogue: 0,{},{},{STYLE_NAME},,0,0,0,,{}",
        track.start_timestamp(),
        track.end_timestamp(),
        event_text(track)
    );

    doc
}
