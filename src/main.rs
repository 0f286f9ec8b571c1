fn main() {
    centerstage_vision::app::main();
}
