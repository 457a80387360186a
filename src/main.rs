use graphite::cmd;

fn main() {
    cmd::run();
}
