pub enum Event {
    Window { words: Vec<i64>, weights: Vec<f64> },
    Flush { ack: crossbeam_channel::Sender<()> },
}
