use kube::CustomResourceExt;
use nmstate_handler::crd::{NodeNetworkConfigurationEnactment, NodeNetworkState};

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&NodeNetworkState::crd())?);
    println!("---");
    print!(
        "{}",
        serde_yaml::to_string(&NodeNetworkConfigurationEnactment::crd())?
    );
    Ok(())
}
