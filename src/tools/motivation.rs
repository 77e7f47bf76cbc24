use rand::Rng;
use rand::seq::SliceRandom;

pub const QUOTES: [&str; 5] = [
    "Kegagalan hanya terjadi bila kita menyerah. - BJ Habibie",
    "Bermimpilah, karena Tuhan akan memeluk mimpi-mimpimu. - Andrea Hirata",
    "Kurang cerdas dapat diperbaiki dengan belajar. Kurang cakap dapat dihilangkan dengan pengalaman. Namun tidak jujur itu sulit diperbaiki. - Bung Hatta",
    "Pebisnis itu harus seperti Jenderal Sudirman, meski sakit tetap memimpin gerilya. Jangan manja!",
    "Sejarah membuktikan, Majapahit besar karena persatuan dan niat dagang yang kuat, bukan karena rebahan.",
];

/// Picks one quote uniformly at random. The input is accepted but not read.
pub fn get_motivation(_input: &str) -> String {
    pick_quote(&mut rand::thread_rng()).to_string()
}

pub fn pick_quote<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}
