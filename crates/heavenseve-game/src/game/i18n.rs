//! Internationalization: UI text in Spanish and English.
//!
//! Dialogue lines come from the config; this module only covers the fixed
//! texts the gameplay layer writes itself (prompts, mission lines, panels).

pub use heavenseve_common::Language;

/// All translatable UI strings, looked up by key.
/// Returns the translated string or "???" if the key is not found.
pub fn t(lang: Language, key: &str) -> &'static str {
    match (lang, key) {
        // ── Interaction prompts ──
        (Language::Spanish, "prompt_talk") => "[E para hablar]",
        (Language::English, "prompt_talk") => "[E to talk]",
        (Language::Spanish, "prompt_open") => "[E para abrir]",
        (Language::English, "prompt_open") => "[E to open]",
        (Language::Spanish, "prompt_repair") => "[E para reparar]",
        (Language::English, "prompt_repair") => "[E to repair]",
        (Language::Spanish, "talk_to_npc_first") => "Habla con el NPC primero [E]",
        (Language::English, "talk_to_npc_first") => "Talk to the NPC first [E]",
        (Language::Spanish, "gate_locked") => "Completa primero las misiones necesarias.",
        (Language::English, "gate_locked") => "Finish the required missions first.",

        // ── Mission text (always visible) ──
        (Language::Spanish, "phase_talk_to_npc") => "Habla con el NPC",
        (Language::English, "phase_talk_to_npc") => "Talk to the NPC",
        (Language::Spanish, "phase_gifts") => "Regalos",
        (Language::English, "phase_gifts") => "Gifts",
        (Language::Spanish, "phase_gifts_found") => "Regalos encontrados",
        (Language::English, "phase_gifts_found") => "Gifts found",
        (Language::Spanish, "phase_deliver") => "Entrega los regalos",
        (Language::English, "phase_deliver") => "Deliver the gifts",
        (Language::Spanish, "phase_closet_open") => "Abre el closet",
        (Language::English, "phase_closet_open") => "Open the closet",
        (Language::Spanish, "phase_closet_collect") => "Saca los peluches favoritos de tu hija",
        (Language::English, "phase_closet_collect") => "Take out your daughter's favourite plushes",
        (Language::Spanish, "phase_plush_delivered") => "Peluche de Pinguino entregado",
        (Language::English, "phase_plush_delivered") => "Penguin plush delivered",
        (Language::Spanish, "phase_bike_repair") => "Repara la bici",
        (Language::English, "phase_bike_repair") => "Repair the bike",
        (Language::Spanish, "phase_bike_repaired") => "Bici reparada",
        (Language::English, "phase_bike_repaired") => "Bike repaired",
        (Language::Spanish, "phase_place_disk") => "Coloca el disco",
        (Language::English, "phase_place_disk") => "Place the record",
        (Language::Spanish, "phase_completed") => "Tocadiscos activado",
        (Language::English, "phase_completed") => "Turntable playing",

        // ── Interaction line ──
        (Language::Spanish, "line_gifts") => "- Regalos",
        (Language::English, "line_gifts") => "- Gifts",
        (Language::Spanish, "line_gifts_found") => "- Regalos encontrados",
        (Language::English, "line_gifts_found") => "- Gifts found",
        (Language::Spanish, "line_room_task") => "- Acomodar los peluches correctos",
        (Language::English, "line_room_task") => "- Put away the right plushes",
        (Language::Spanish, "line_room_done") => "- Peluche de Pingüino entregado",
        (Language::English, "line_room_done") => "- Penguin plush delivered",
        (Language::Spanish, "line_turntable_done") => "- Tocadiscos activado",
        (Language::English, "line_turntable_done") => "- Turntable playing",

        // ── Turntable ──
        (Language::Spanish, "turntable_locked") => "Completa las otras misiones primero.",
        (Language::English, "turntable_locked") => "Finish the other missions first.",
        (Language::Spanish, "turntable_need_disk") => "Necesitas el disco para usar el tocadiscos.",
        (Language::English, "turntable_need_disk") => "You need the record to use the turntable.",

        // ── Closet ──
        (Language::Spanish, "confirm_plush") => "¿Elegir este peluche?\n[Q] Sí   [E] Regresar",
        (Language::English, "confirm_plush") => "Pick this plush?\n[Q] Yes   [E] Back",

        // ── Level exits ──
        (Language::Spanish, "exit_go_to") => "[Q] para ir a",
        (Language::English, "exit_go_to") => "[Q] to go to",
        (Language::Spanish, "exit_locked") => "Primero completa la misión.",
        (Language::English, "exit_locked") => "Finish the mission first.",

        // ── Panels ──
        (Language::Spanish, "game_over_title") => "FIN DEL JUEGO",
        (Language::English, "game_over_title") => "GAME OVER",
        (Language::Spanish, "game_over_hint") => "[R] Reintentar   [M] Menú   [Q] Salir",
        (Language::English, "game_over_hint") => "[R] Retry   [M] Menu   [Q] Quit",
        (Language::Spanish, "pause_title") => "= PAUSA =",
        (Language::English, "pause_title") => "= PAUSED =",
        (Language::Spanish, "dialogue_hint") => "[Espacio] Continuar",
        (Language::English, "dialogue_hint") => "[Space] Continue",

        _ => "???",
    }
}

/// "- Encontrar los 3 regalos"
pub fn find_gifts_line(lang: Language, target: usize) -> String {
    match lang {
        Language::Spanish => format!("- Encontrar los {} regalos", target),
        Language::English => format!("- Find the {} gifts", target),
    }
}

/// "Regalos: 1/3" or "- Regalos: 1/3" depending on the key
pub fn counted(lang: Language, key: &str, current: usize, total: usize) -> String {
    format!("{}: {}/{}", t(lang, key), current, total)
}
